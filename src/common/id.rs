//! Kademlia node Id or a content key
use bytes::Bytes;
use rand::Rng;
use std::{
    fmt::{self, Debug, Display, Formatter},
    ops::BitXor,
};

use super::content_hash;

/// The size of a [Magnitude] in bytes.
pub const MAGNITUDE_SIZE: usize = 20;
/// Number of distinct bucket indices, one per bit of a [Magnitude].
pub const MAX_DISTANCE: usize = MAGNITUDE_SIZE * 8;

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Node Id or a lookup target.
///
/// Ids are opaque byte strings, ordered lexicographically. For distance
/// purposes they are read as decimal integers, see [Id::magnitude].
pub struct Id(Bytes);

impl Id {
    /// Create an Id from any byte string.
    pub fn new<T: Into<Bytes>>(bytes: T) -> Id {
        Id(bytes.into())
    }

    /// A random numeric Id.
    pub fn random() -> Id {
        let mut rng = rand::thread_rng();
        let n: u64 = rng.gen();

        Id::from(n.to_string())
    }

    /// The Id addressing `value`, i.e. its content hash.
    pub fn from_content(value: &[u8]) -> Id {
        Id(Bytes::copy_from_slice(&content_hash(value)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Integer value of this Id.
    ///
    /// Reads the leading decimal digits, after an optional `+`. Ids with no
    /// leading digits, negative Ids and values wider than 160 bits all read as zero.
    pub fn magnitude(&self) -> Magnitude {
        let digits = match self.0.first() {
            Some(b'+') => &self.0[1..],
            _ => &self.0[..],
        };

        let mut magnitude = Magnitude::ZERO;
        for digit in digits.iter().take_while(|b| b.is_ascii_digit()) {
            match magnitude.mul_add(10, digit - b'0') {
                Some(next) => magnitude = next,
                None => return Magnitude::ZERO,
            }
        }

        magnitude
    }

    /// XOR distance between this Id and another Id.
    ///
    /// Distance to self is zero.
    pub fn distance(&self, other: &Id) -> Magnitude {
        self.magnitude() ^ other.magnitude()
    }

    /// Index of the bucket this Id belongs to: the highest set bit of its
    /// magnitude, or 0 for a zero magnitude.
    pub fn bucket_index(&self) -> usize {
        self.magnitude().highest_bit().unwrap_or(0)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id(Bytes::from(s))
    }
}

impl From<&[u8]> for Id {
    fn from(bytes: &[u8]) -> Self {
        Id(Bytes::copy_from_slice(bytes))
    }
}

impl From<[u8; 20]> for Id {
    fn from(bytes: [u8; 20]) -> Self {
        Id(Bytes::copy_from_slice(&bytes))
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) if s.chars().all(|c| c.is_ascii_graphic()) => write!(f, "{}", s),
            _ => {
                for byte in self.0.iter() {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

impl Debug for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
/// Unsigned 160 bit integer, stored big-endian so that the derived ordering is numeric.
pub struct Magnitude(pub [u8; MAGNITUDE_SIZE]);

impl Magnitude {
    pub const ZERO: Magnitude = Magnitude([0; MAGNITUDE_SIZE]);

    /// `2^exponent`, or `None` if it doesn't fit in 160 bits.
    pub fn pow2(exponent: usize) -> Option<Magnitude> {
        if exponent >= MAX_DISTANCE {
            return None;
        }

        let mut bytes = [0; MAGNITUDE_SIZE];
        bytes[MAGNITUDE_SIZE - 1 - exponent / 8] = 1 << (exponent % 8);

        Some(Magnitude(bytes))
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Position of the highest set bit, `None` for zero.
    pub fn highest_bit(&self) -> Option<usize> {
        for (i, byte) in self.0.iter().enumerate() {
            if *byte != 0 {
                let leading_zeros = i * 8 + byte.leading_zeros() as usize;

                return Some(MAX_DISTANCE - 1 - leading_zeros);
            }
        }

        None
    }

    /// `self * factor + addend`, `None` on overflow.
    fn mul_add(&self, factor: u8, addend: u8) -> Option<Magnitude> {
        let mut bytes = [0; MAGNITUDE_SIZE];
        let mut carry = addend as u16;

        for i in (0..MAGNITUDE_SIZE).rev() {
            let value = self.0[i] as u16 * factor as u16 + carry;
            bytes[i] = value as u8;
            carry = value >> 8;
        }

        if carry != 0 {
            return None;
        }

        Some(Magnitude(bytes))
    }
}

impl BitXor for Magnitude {
    type Output = Magnitude;

    fn bitxor(self, rhs: Magnitude) -> Magnitude {
        let mut bytes = [0; MAGNITUDE_SIZE];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = self.0[i] ^ rhs.0[i];
        }

        Magnitude(bytes)
    }
}

impl From<u128> for Magnitude {
    fn from(n: u128) -> Self {
        let mut bytes = [0; MAGNITUDE_SIZE];
        bytes[MAGNITUDE_SIZE - 16..].copy_from_slice(&n.to_be_bytes());

        Magnitude(bytes)
    }
}

impl Debug for Magnitude {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Magnitude(0x")?;
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}
