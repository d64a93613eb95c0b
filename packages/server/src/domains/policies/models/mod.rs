pub mod policy;
pub mod scraped_page;

pub use policy::*;
pub use scraped_page::*;
