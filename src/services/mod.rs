// External gateways and the relationship toggle core.

pub mod blob;
pub mod identity;
pub mod relationship;
pub mod token;

pub use blob::{BlobError, BlobGateway, S3BlobGateway};
pub use identity::{AuthTokens, CognitoIdentityGateway, IdentityError, IdentityGateway};
pub use relationship::{FollowOutcome, LikeOutcome, RelationshipService};
pub use token::{JwksTokenVerifier, StaticTokenVerifier, TokenError, TokenVerifier};
