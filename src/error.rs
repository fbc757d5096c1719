use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum FilterError {
    #[error(
        "GCF/GCA syntax error, one or more accession ids have an incorrect format, should be GCF_XXXXXXXXX.X or GCA_XXXXXXXXX.X"
    )]
    #[diagnostic(help("found {found} accession clause(s) but only {valid} valid one(s)"))]
    MalformedAccession { found: usize, valid: usize },

    #[error("invalid assembly accession: {0}")]
    InvalidAssemblyAccession(String),

    #[error("invalid filter expression: {}", .0.join(" "))]
    InvalidExpression(Vec<String>),

    #[error("ENA API error: status: {status}, message: {message}")]
    ResolverFailed { status: u16, message: String },

    #[error("ENA request failed: {0}")]
    EnaHttp(String),

    #[error("unexpected ENA payload: {0}")]
    EnaPayload(String),

    #[error("missing config file at {0}")]
    MissingConfig(Utf8PathBuf),

    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("server error: {0}")]
    Server(String),
}

impl FilterError {
    /// HTTP status the inbound endpoint answers with when this error ends a request.
    pub fn status_code(&self) -> u16 {
        match self {
            FilterError::MalformedAccession { .. }
            | FilterError::InvalidAssemblyAccession(_)
            | FilterError::InvalidExpression(_) => 400,
            FilterError::EnaHttp(_) | FilterError::EnaPayload(_) => 502,
            FilterError::ResolverFailed { .. }
            | FilterError::MissingConfig(_)
            | FilterError::ConfigRead(_)
            | FilterError::ConfigParse(_)
            | FilterError::Server(_) => 500,
        }
    }

    pub fn is_syntax(&self) -> bool {
        self.status_code() == 400
    }
}
