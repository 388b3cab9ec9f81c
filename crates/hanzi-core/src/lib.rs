pub mod dictionary;
pub mod dom;
pub mod highlight;
pub mod language;
pub mod popup;
pub mod preprocess;
pub mod projector;
pub mod resolver;
pub mod session;
pub mod span;
