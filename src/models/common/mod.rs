pub mod page;
pub mod pagination;
pub mod response;

pub use page::{FlashLevel, FlashMessage, PageResponse};
pub use pagination::{PaginationInfo, parse_page_number};
pub use response::ApiResponse;
