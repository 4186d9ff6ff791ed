// Utility modules

pub mod cursor;
pub mod forms;
pub mod response;
pub mod service_error;
pub mod sigv4;
pub mod validation;

pub use cursor::{decode_last_key, encode_last_key};
pub use forms::{parse_form, FileUpload, FormData};
pub use response::{ok_message, ok_payload, PaginatedResponse};
pub use service_error::ApiError;
pub use validation::{
    is_allowed_image, is_valid_confirmation_code, is_valid_email, is_valid_password,
};
