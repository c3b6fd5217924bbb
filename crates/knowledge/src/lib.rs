//! Static ISTP reference data and the topic categorizer.
//!
//! Everything here is read-only: the knowledge base is `const` data and
//! [`categorize`] is a total function over arbitrary input text.

pub mod base;
pub mod category;

pub use base::{KNOWLEDGE, KnowledgeBase};
pub use category::{Category, categorize, keywords};
