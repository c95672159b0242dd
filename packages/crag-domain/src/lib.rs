pub mod document;
pub mod extract;
pub mod keyword;
pub mod lexicon;
pub mod morph;
pub mod quality;
pub mod script;
pub mod similarity;
pub mod taxonomy;
pub mod terms;
