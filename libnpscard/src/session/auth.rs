// libnpscard/src/session/auth.rs

//! Legacy DESFire native authentication (INS 0x0A) with a single DES key.
//!
//! The reader side only ever uses the DES *decipher* operation, in the
//! "send mode" chaining legacy DESFire expects:
//!
//! 1. card: `ek(RndB)` with status `0xAF`
//! 2. reader: `D1 = D(RndA)`, `D2 = D(RndB' ^ D1)` where `RndB'` is RndB
//!    rotated left by one byte
//! 3. card: `ek(RndA')` with status `0x00`; the reader checks it against
//!    RndA rotated left.

use crate::constants::DES_BLOCK_LEN;
use crate::types::DesKey;
use crate::{ProtocolError, Result};
use des::Des;
use des::cipher::generic_array::GenericArray;
use des::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

/// One DES block.
pub type Block = [u8; DES_BLOCK_LEN];

fn cipher(key: &DesKey) -> Des {
    Des::new(GenericArray::from_slice(key.as_bytes()))
}

pub(crate) fn des_encrypt(key: &DesKey, block: &Block) -> Block {
    let mut b = GenericArray::clone_from_slice(block);
    cipher(key).encrypt_block(&mut b);
    let mut out = [0u8; DES_BLOCK_LEN];
    out.copy_from_slice(&b);
    out
}

pub(crate) fn des_decrypt(key: &DesKey, block: &Block) -> Block {
    let mut b = GenericArray::clone_from_slice(block);
    cipher(key).decrypt_block(&mut b);
    let mut out = [0u8; DES_BLOCK_LEN];
    out.copy_from_slice(&b);
    out
}

pub(crate) fn rotate_left(block: &Block) -> Block {
    let mut out = *block;
    out.rotate_left(1);
    out
}

pub(crate) fn xor(a: &Block, b: &Block) -> Block {
    let mut out = [0u8; DES_BLOCK_LEN];
    for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
        *o = x ^ y;
    }
    out
}

/// Reader-side state between the two authentication passes.
pub(crate) struct LegacyAuth {
    key: DesKey,
    rnd_a: Block,
}

impl LegacyAuth {
    pub(crate) fn new(key: DesKey, rnd_a: Block) -> Self {
        Self { key, rnd_a }
    }

    /// Answer the card's `ek(RndB)` challenge with `D1 || D2`.
    pub(crate) fn answer_challenge(&self, challenge: &[u8]) -> Result<[u8; 16]> {
        let ek_rnd_b: Block = challenge
            .try_into()
            .map_err(|_| ProtocolError::UnexpectedLength {
                expected: DES_BLOCK_LEN,
                actual: challenge.len(),
            })?;

        let rnd_b = des_decrypt(&self.key, &ek_rnd_b);
        let d1 = des_decrypt(&self.key, &self.rnd_a);
        let d2 = des_decrypt(&self.key, &xor(&rotate_left(&rnd_b), &d1));

        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&d1);
        out[8..].copy_from_slice(&d2);
        Ok(out)
    }

    /// Check the card's `ek(RndA')` proof; `false` when it does not decrypt
    /// to RndA rotated left.
    pub(crate) fn verify(&self, proof: &[u8]) -> Result<bool> {
        let ek_rnd_a_rot: Block = proof
            .try_into()
            .map_err(|_| ProtocolError::UnexpectedLength {
                expected: DES_BLOCK_LEN,
                actual: proof.len(),
            })?;
        Ok(des_decrypt(&self.key, &ek_rnd_a_rot) == rotate_left(&self.rnd_a))
    }
}

/// Card-side check of the reader's `D1 || D2` answer. Returns `ek(RndA')`
/// when the reader proved knowledge of `key` for the given RndB.
pub(crate) fn card_verify_answer(key: &DesKey, rnd_b: &Block, answer: &[u8]) -> Option<Block> {
    if answer.len() != 2 * DES_BLOCK_LEN {
        return None;
    }
    let mut d1 = [0u8; DES_BLOCK_LEN];
    let mut d2 = [0u8; DES_BLOCK_LEN];
    d1.copy_from_slice(&answer[..8]);
    d2.copy_from_slice(&answer[8..]);

    let rnd_a = des_encrypt(key, &d1);
    let rnd_b_rot = xor(&des_encrypt(key, &d2), &d1);
    if rnd_b_rot != rotate_left(rnd_b) {
        return None;
    }
    Some(des_encrypt(key, &rotate_left(&rnd_a)))
}
