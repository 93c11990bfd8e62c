#![forbid(unsafe_code)]

mod dto;
mod error_mapping;
mod errors;

pub use dto::{
    require_positive, require_str, CartItemDto, InviteRequest, InviteRespondRequest,
    LoadPointsRequest, PlaceOrderRequest, ProductUpsertRequest, RegisterRequest,
    TeamCreateRequest, UpdateOrderStatusRequest,
};
pub use error_mapping::map_error;
pub use errors::{ApiError, ApiErrorCode};

pub const CRATE_NAME: &str = "stray-paws-api";
pub const API_VERSION: &str = "1";
