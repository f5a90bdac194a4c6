pub mod city_page;
pub mod shell;

pub use city_page::CityPage;
pub use shell::{Page, Shell, HOME_MAP_LINK};
