pub mod error;
pub mod post;
pub mod profile;
pub mod search;
pub mod timestamp;
pub mod user;

use entrait::entrait_export as entrait;

///
/// Mockable system abstraction
///
#[entrait(mock_api=SystemMock)]
pub trait System {
    fn get_current_time(&self) -> time::OffsetDateTime;
}

///
/// Mockable config accessor
///
#[entrait(mock_api=GetConfigMock)]
pub trait GetConfig {
    fn get_jwt_signing_key(&self) -> &hmac::Hmac<sha2::Sha384>;
}

pub mod test {
    use super::*;
    use hmac::Mac;
    use unimock::*;

    pub fn mock_system_and_config() -> impl unimock::Clause {
        (
            SystemMock::get_current_time
                .each_call(matching!())
                .returns(time::OffsetDateTime::UNIX_EPOCH),
            GetConfigMock::get_jwt_signing_key
                .each_call(matching!())
                .returns(
                    hmac::Hmac::<sha2::Sha384>::new_from_slice("foobar".as_bytes())
                        .expect("HMAC-SHA-384 can accept any key length"),
                ),
        )
    }
}
