//! Response-resolution pipeline: categorize a question, answer it remotely
//! or from local templates, personalize the text, and stream it out as a
//! typing effect.

pub mod conversation;
pub mod personalize;
pub mod resolver;
pub mod sequencer;
pub mod templates;

pub use conversation::{ConversationEntry, ConversationLog, Sender};
pub use resolver::{ResponseResolver, ResponseResult, ResponseSource, user_facing_message};
pub use sequencer::{DeliveryEvent, DeliveryOutcome, DeliverySequencer, plain_text, render_markup};
