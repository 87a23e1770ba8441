pub mod prekeys;
pub mod x3dh;

pub use prekeys::{generate_bundles, generate_bundles_with_rng, KeyBundle, PrivateKeyBundle};
pub use x3dh::Role;
