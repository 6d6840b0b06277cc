pub mod filing;
pub mod parsing;
pub mod report;
pub mod section;
