use thiserror::Error;

use crate::source::FetchError;

#[derive(Debug, Error)]
pub enum TypeaheadError {
    #[error(
        "No search endpoint configured.\n\nPass --endpoint <URL> or set 'endpoint' in the [http] section of ~/.config/typeahead/config.toml"
    )]
    MissingEndpoint,

    #[error("Failed to set up search source: {0}")]
    Source(#[from] FetchError),
}
