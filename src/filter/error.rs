use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid id token '{token}' in parameter '{param}'")]
    InvalidIdList { param: String, token: String },
}
