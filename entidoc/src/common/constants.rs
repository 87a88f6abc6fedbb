// document constants
pub const ETAG_FIELD: &str = "_etag";
pub const ID_FIELD: &str = "id";

// query constants
pub const PARAMETER_PREFIX: &str = "@";
pub const ROOT_ID_PARAMETER: &str = "@ROOT_ID";
// Returns exactly the item with the given id in a container
pub const FIND_ONE_BY_ID_QUERY: &str = "SELECT * FROM root WHERE root.id = @ROOT_ID";

// container constants
pub const NO_PARTITION_KEY_PATH: &str = "/null";

// store status codes
pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_NO_CONTENT: u16 = 204;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_PRECONDITION_FAILED: u16 = 412;

pub const ENTIDOC_VERSION: &str = env!("CARGO_PKG_VERSION");
