// Resume entry editing: schema registry, editor state machine, sessions and
// the text-enhancement collaborator.

pub mod dates;
pub mod editor;
pub mod enhancement;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod schema;
pub mod sessions;
