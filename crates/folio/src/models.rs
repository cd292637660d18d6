//! The objects passed around by the orchestration loop.
//!
//! There are a few related formats in play: the JSON bodies the site
//! frontend sends, the OpenAI-style wire format sent to the model
//! backends, and the marker grammar embedded in plain-text completions.
//! All of them are converted into these internal structs at the
//! boundary, so the loop only ever sees one shape.

pub mod message;
pub mod role;
pub mod tool;
