// NFL weekly pick'em site adapter: group roster and per-week pick pages.

pub mod pages;
pub mod site;

pub use site::NflPickemSite;
