pub mod cedict;
pub mod loader;
pub mod pinyin;
pub mod processor;

pub use loader::CedictLoader;
pub use pinyin::numbered_to_marks;
pub use processor::ChineseProcessor;
