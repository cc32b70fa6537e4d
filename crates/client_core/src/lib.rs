pub mod classify;
pub mod detail_controller;
pub mod list_controller;
pub mod pagination;
pub mod query;
pub mod source;

pub use detail_controller::{DetailController, DetailViewState};
pub use list_controller::{ListConfig, ListController, ListViewState};
pub use pagination::{paginate, Page};
pub use source::{CountrySource, RestCountriesSource, SourceSetupError};
