mod network;
mod schedule;
mod section;
mod section_controller;
mod train;

pub use network::{check_routes, index_sections, resolve_network, validate_network, SectionIndex};
pub use schedule::{Schedule, TrainSlot};
pub use section::{SectionType, TrackSection};
pub use section_controller::SectionController;
pub use train::{Priority, Train, TrainType};
