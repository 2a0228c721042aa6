use serde::{Deserialize, Serialize};
use url::Url;

use crate::ids::{AppDataId, ExperienceId, TalentId};
use crate::product::ProductFrame;
use crate::time::Timecode;

/// Domain payload of a timed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimedEventKind {
    /// A credited person is on screen.
    Talent(TalentId),
    /// A shoppable scene keyed into the product service's frame namespace.
    Product(ProductFrame),
    /// A shareable clip with its overlay image.
    ClipShare {
        clip: ExperienceId,
        #[serde(default)]
        image_url: Option<Url>,
    },
    /// A location record becomes relevant.
    Location(AppDataId),
    /// A gallery becomes relevant.
    Gallery(ExperienceId),
    /// Trivia or caption text.
    TextItem(String),
}

/// Domain fact valid over a window of the main feature timeline.
///
/// Immutable once loaded; the index below owns ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub kind: TimedEventKind,
    pub start: Timecode,
    pub end: Timecode,
    /// Experience subtree the event belongs to.
    #[serde(default)]
    pub experience: Option<ExperienceId>,
}

impl TimedEvent {
    pub fn new(kind: TimedEventKind, start: f64, end: f64) -> Self {
        TimedEvent {
            kind,
            start: Timecode(start),
            end: Timecode(end),
            experience: None,
        }
    }

    /// Whether `time` falls inside the half-open window `[start, end)`.
    pub fn covers(&self, time: Timecode) -> bool {
        self.start <= time && time < self.end
    }

    pub fn talent_id(&self) -> Option<&TalentId> {
        match &self.kind {
            TimedEventKind::Talent(id) => Some(id),
            _ => None,
        }
    }

    pub fn product_frame(&self) -> Option<&ProductFrame> {
        match &self.kind {
            TimedEventKind::Product(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn is_clip_share(&self) -> bool {
        matches!(self.kind, TimedEventKind::ClipShare { .. })
    }
}

/// Timed events sorted by start timecode, supporting the lookups the
/// dispatcher runs on every time tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimedEventIndex {
    events: Vec<TimedEvent>,
}

impl TimedEventIndex {
    /// Builds the index, sorting by start time. Input order is irrelevant.
    pub fn new(mut events: Vec<TimedEvent>) -> Self {
        events.sort_by(|a, b| a.start.total_cmp(&b.start));
        TimedEventIndex { events }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimedEvent> {
        self.events.iter()
    }

    /// All events whose window covers `time`, in start order.
    pub fn active_at(&self, time: Timecode) -> Vec<&TimedEvent> {
        self.events.iter().filter(|event| event.covers(time)).collect()
    }

    /// Talent ids active at `time`, unordered; billing order is applied by
    /// the manifest, which owns the talent records.
    pub fn talent_at(&self, time: Timecode) -> Vec<&TalentId> {
        self.events
            .iter()
            .filter(|event| event.covers(time))
            .filter_map(TimedEvent::talent_id)
            .collect()
    }

    /// Nearest event at or before `time` satisfying `pred`, optionally
    /// rejected when it started more than `tolerance` seconds ago.
    pub fn closest_before(
        &self,
        time: Timecode,
        tolerance: Option<f64>,
        pred: impl Fn(&TimedEvent) -> bool,
    ) -> Option<&TimedEvent> {
        let upper = self
            .events
            .partition_point(|event| event.start.as_secs_f64() <= time.as_secs_f64());
        let found = self.events[..upper].iter().rev().find(|event| pred(event))?;
        if let Some(tolerance) = tolerance
            && found.start.distance(&time) > tolerance
        {
            return None;
        }
        Some(found)
    }

    /// Frame key of the nearest preceding product event, if any.
    pub fn product_frame_at(&self, time: Timecode) -> Option<&ProductFrame> {
        self.closest_before(time, None, |event| {
            matches!(event.kind, TimedEventKind::Product(_))
        })
        .and_then(TimedEvent::product_frame)
    }

    /// Nearest preceding clip-share event within `tolerance` seconds.
    pub fn clip_share_at(
        &self,
        time: Timecode,
        tolerance: f64,
    ) -> Option<&TimedEvent> {
        self.closest_before(time, Some(tolerance), TimedEvent::is_clip_share)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn talent(id: &str, start: f64, end: f64) -> TimedEvent {
        TimedEvent::new(TimedEventKind::Talent(TalentId::from(id)), start, end)
    }

    fn product(key: &str, start: f64) -> TimedEvent {
        TimedEvent::new(
            TimedEventKind::Product(ProductFrame::from(key)),
            start,
            start,
        )
    }

    fn clip_share(id: &str, start: f64) -> TimedEvent {
        TimedEvent::new(
            TimedEventKind::ClipShare {
                clip: ExperienceId::from(id),
                image_url: None,
            },
            start,
            start,
        )
    }

    #[test]
    fn sorts_on_construction() {
        let index = TimedEventIndex::new(vec![
            talent("late", 100.0, 120.0),
            talent("early", 5.0, 30.0),
            talent("middle", 40.0, 60.0),
        ]);
        let starts: Vec<f64> =
            index.iter().map(|e| e.start.as_secs_f64()).collect();
        assert_eq!(starts, [5.0, 40.0, 100.0]);
    }

    #[test]
    fn window_is_half_open() {
        let index = TimedEventIndex::new(vec![talent("a", 10.0, 20.0)]);
        assert!(index.active_at(Timecode(10.0)).len() == 1);
        assert!(index.active_at(Timecode(19.9)).len() == 1);
        assert!(index.active_at(Timecode(20.0)).is_empty());
        assert!(index.active_at(Timecode(9.9)).is_empty());
    }

    #[test]
    fn collects_all_overlapping_talent() {
        let index = TimedEventIndex::new(vec![
            talent("a", 0.0, 50.0),
            talent("b", 20.0, 40.0),
            talent("c", 45.0, 60.0),
        ]);
        let active = index.talent_at(Timecode(25.0));
        assert_eq!(active.len(), 2);
        assert!(active.iter().any(|id| id.as_str() == "a"));
        assert!(active.iter().any(|id| id.as_str() == "b"));
    }

    #[test]
    fn product_frame_picks_nearest_preceding() {
        let index = TimedEventIndex::new(vec![
            product("frame-10", 10.0),
            product("frame-30", 30.0),
            product("frame-50", 50.0),
        ]);
        assert_eq!(
            index.product_frame_at(Timecode(35.0)).map(ProductFrame::as_str),
            Some("frame-30")
        );
        assert_eq!(
            index.product_frame_at(Timecode(30.0)).map(ProductFrame::as_str),
            Some("frame-30")
        );
        assert!(index.product_frame_at(Timecode(5.0)).is_none());
    }

    #[test]
    fn clip_share_respects_tolerance() {
        let index = TimedEventIndex::new(vec![clip_share("clip", 100.0)]);
        assert!(index.clip_share_at(Timecode(105.0), 10.0).is_some());
        assert!(index.clip_share_at(Timecode(115.0), 10.0).is_none());
        assert!(index.clip_share_at(Timecode(99.0), 10.0).is_none());
    }

    #[test]
    fn closest_before_skips_non_matching_kinds() {
        let index = TimedEventIndex::new(vec![
            product("frame-10", 10.0),
            talent("a", 20.0, 30.0),
        ]);
        assert_eq!(
            index.product_frame_at(Timecode(25.0)).map(ProductFrame::as_str),
            Some("frame-10")
        );
    }
}
