pub mod api_response;
pub mod dates;
pub mod lenient;
