/// Presentation layer: thin egui widgets over the query engine's tables and
/// scalars. No query logic lives here.

pub mod dashboard;
pub mod panels;
