use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::appdata::AppData;
use crate::error::{ModelError, Result};
use crate::experience::Experience;
use crate::ids::{AppDataId, TalentId};
use crate::style::TitleStyle;
use crate::talent::Talent;
use crate::time::Timecode;
use crate::timed_event::{TimedEvent, TimedEventIndex};

/// Mandatory sub-structure of a title manifest, named in structural errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestSection {
    MainExperience,
    InMovieExperience,
    OutOfMovieExperience,
}

impl std::fmt::Display for ManifestSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestSection::MainExperience => write!(f, "main experience"),
            ManifestSection::InMovieExperience => {
                write!(f, "in-movie experience")
            }
            ManifestSection::OutOfMovieExperience => {
                write!(f, "out-of-movie experience")
            }
        }
    }
}

/// Raw parse result of the manifest document, before structural checks.
///
/// Produced by the manifest parser; every section is optional here because
/// the document may genuinely lack it. [`Manifest::assemble`] turns this
/// into the validated aggregate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestDocument {
    #[serde(default)]
    pub main_experience: Option<Experience>,
    #[serde(default)]
    pub in_movie: Option<Experience>,
    #[serde(default)]
    pub out_of_movie: Option<Experience>,
    #[serde(default)]
    pub talent: Vec<Talent>,
    #[serde(default)]
    pub timed_events: Vec<TimedEvent>,
}

impl ManifestDocument {
    /// Checks the three mandatory sections, reporting the first missing one.
    pub fn validate(&self) -> Result<()> {
        if self.main_experience.is_none() {
            return Err(ModelError::MissingSection(
                ManifestSection::MainExperience,
            ));
        }
        if self.in_movie.is_none() {
            return Err(ModelError::MissingSection(
                ManifestSection::InMovieExperience,
            ));
        }
        if self.out_of_movie.is_none() {
            return Err(ModelError::MissingSection(
                ManifestSection::OutOfMovieExperience,
            ));
        }
        Ok(())
    }
}

/// Fully loaded title manifest.
///
/// Built once per title load and shared immutably; a reload produces a
/// fresh value rather than mutating this one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub main_experience: Experience,
    pub in_movie: Experience,
    pub out_of_movie: Experience,
    pub talent: Vec<Talent>,
    pub timed_events: TimedEventIndex,
    pub app_data: HashMap<AppDataId, AppData>,
    pub style: Option<TitleStyle>,
    pub loaded_at: DateTime<Utc>,
}

impl Manifest {
    /// Validates and assembles the aggregate from its loaded pieces.
    pub fn assemble(
        document: ManifestDocument,
        app_data: Vec<AppData>,
        style: Option<TitleStyle>,
    ) -> Result<Manifest> {
        let ManifestDocument {
            main_experience,
            in_movie,
            out_of_movie,
            talent,
            timed_events,
        } = document;
        let main_experience = main_experience.ok_or(
            ModelError::MissingSection(ManifestSection::MainExperience),
        )?;
        let in_movie = in_movie.ok_or(ModelError::MissingSection(
            ManifestSection::InMovieExperience,
        ))?;
        let out_of_movie = out_of_movie.ok_or(ModelError::MissingSection(
            ManifestSection::OutOfMovieExperience,
        ))?;
        Ok(Manifest {
            main_experience,
            in_movie,
            out_of_movie,
            talent,
            timed_events: TimedEventIndex::new(timed_events),
            app_data: app_data
                .into_iter()
                .map(|record| (record.id.clone(), record))
                .collect(),
            style,
            loaded_at: Utc::now(),
        })
    }

    pub fn talent(&self, id: &TalentId) -> Option<&Talent> {
        self.talent.iter().find(|talent| &talent.id == id)
    }

    /// Talent on screen at `time`, ordered by billing.
    pub fn talent_at(&self, time: Timecode) -> Vec<&Talent> {
        let mut active: Vec<&Talent> = self
            .timed_events
            .talent_at(time)
            .into_iter()
            .filter_map(|id| self.talent(id))
            .collect();
        active.sort_by_key(|talent| talent.billing_order);
        active
    }

    pub fn app_data(&self, id: &AppDataId) -> Option<&AppData> {
        self.app_data.get(id)
    }

    /// Location records for the map surface.
    pub fn locations(&self) -> Vec<&AppData> {
        let mut locations: Vec<&AppData> = self
            .app_data
            .values()
            .filter(|record| record.coordinate().is_some())
            .collect();
        locations.sort_by(|a, b| a.title.cmp(&b.title));
        locations
    }

    pub fn interstitial_url(&self) -> Option<&Url> {
        self.main_experience.interstitial_video_url.as_ref()
    }

    pub fn feature_video_url(&self) -> Option<&Url> {
        self.main_experience.video_url.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experience::ExperienceKind;
    use crate::ids::ExperienceId;
    use crate::talent::TalentKind;
    use crate::timed_event::TimedEventKind;

    fn experience(id: &str, kind: ExperienceKind) -> Experience {
        Experience::new(ExperienceId::from(id), kind, id)
    }

    fn full_document() -> ManifestDocument {
        ManifestDocument {
            main_experience: Some(experience(
                "main",
                ExperienceKind::MainFeature,
            )),
            in_movie: Some(experience("in", ExperienceKind::InMovie)),
            out_of_movie: Some(experience("out", ExperienceKind::OutOfMovie)),
            talent: Vec::new(),
            timed_events: Vec::new(),
        }
    }

    #[test]
    fn validate_names_the_missing_section() {
        let mut document = full_document();
        document.in_movie = None;
        match document.validate() {
            Err(ModelError::MissingSection(section)) => {
                assert_eq!(section, ManifestSection::InMovieExperience);
            }
            other => panic!("expected missing section, got {other:?}"),
        }
    }

    #[test]
    fn assemble_succeeds_with_all_sections() {
        let manifest =
            Manifest::assemble(full_document(), Vec::new(), None).unwrap();
        assert_eq!(manifest.main_experience.id.as_str(), "main");
        assert!(manifest.style.is_none());
    }

    #[test]
    fn talent_at_orders_by_billing() {
        let mut document = full_document();
        let mut lead =
            Talent::new(TalentId::from("lead"), "Lead", TalentKind::Actor, 1);
        lead.character = Some("Hero".into());
        let support = Talent::new(
            TalentId::from("support"),
            "Support",
            TalentKind::Actor,
            2,
        );
        document.talent = vec![support, lead];
        document.timed_events = vec![
            TimedEvent::new(
                TimedEventKind::Talent(TalentId::from("support")),
                0.0,
                100.0,
            ),
            TimedEvent::new(
                TimedEventKind::Talent(TalentId::from("lead")),
                0.0,
                100.0,
            ),
        ];

        let manifest =
            Manifest::assemble(document, Vec::new(), None).unwrap();
        let active = manifest.talent_at(Timecode(50.0));
        let names: Vec<&str> =
            active.iter().map(|talent| talent.name.as_str()).collect();
        assert_eq!(names, ["Lead", "Support"]);
    }
}
