/// Error code a provider attaches to a request the user declined.
///
/// See <https://eips.ethereum.org/EIPS/eip-1193#provider-errors>
pub const USER_REJECTED_REQUEST: i64 = 4001;
