//! Corpus data model
//!
//! The types flowing through the pipeline: scheduled work units, in-progress
//! collection structures, and the final extracted poem records.

mod collection;
mod poem;
mod work_item;

pub use collection::{Collection, CollectionComponent, PoemInfo, Section};
pub use poem::{ExtractedPoem, PoemMetadata, PoemStructure};
pub use work_item::{CollectionContext, HubContext, WorkItem};
