use envseal::{generate_key_pair, KeySize, PrivateKey, PublicKey};
use lazy_static::lazy_static;

lazy_static! {
    /// One shared 2048-bit key pair for the whole integration suite; RSA key
    /// generation is too slow to repeat per test.
    pub static ref KEY_PAIR: (PrivateKey, PublicKey) =
        generate_key_pair(KeySize::Bit2048).expect("RSA key generation");
}

pub fn private_key() -> &'static PrivateKey {
    &KEY_PAIR.0
}

pub fn public_key() -> &'static PublicKey {
    &KEY_PAIR.1
}
