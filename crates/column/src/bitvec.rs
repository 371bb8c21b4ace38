// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

/// Packed validity bitmap, one bit per row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitVec {
	words: Vec<u64>,
	len: usize,
}

impl BitVec {
	pub fn new() -> Self {
		Self {
			words: Vec::new(),
			len: 0,
		}
	}

	pub fn with_capacity(bits: usize) -> Self {
		Self {
			words: Vec::with_capacity(bits.div_ceil(64)),
			len: 0,
		}
	}

	pub fn from_slice(bits: &[bool]) -> Self {
		let mut bitvec = Self::with_capacity(bits.len());
		for &bit in bits {
			bitvec.push(bit);
		}
		bitvec
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn push(&mut self, bit: bool) {
		let word = self.len / 64;
		if word == self.words.len() {
			self.words.push(0);
		}
		if bit {
			self.words[word] |= 1 << (self.len % 64);
		}
		self.len += 1;
	}

	pub fn get(&self, index: usize) -> bool {
		assert!(index < self.len, "bit index {index} out of bounds (len {})", self.len);
		self.words[index / 64] >> (index % 64) & 1 == 1
	}

	pub fn set(&mut self, index: usize, bit: bool) {
		assert!(index < self.len, "bit index {index} out of bounds (len {})", self.len);
		let mask = 1u64 << (index % 64);
		if bit {
			self.words[index / 64] |= mask;
		} else {
			self.words[index / 64] &= !mask;
		}
	}

	pub fn count_ones(&self) -> usize {
		self.words.iter().map(|w| w.count_ones() as usize).sum()
	}

	pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
		(0..self.len).map(|i| self.get(i))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_push_get() {
		let mut bitvec = BitVec::new();
		bitvec.push(true);
		bitvec.push(false);
		bitvec.push(true);

		assert_eq!(bitvec.len(), 3);
		assert!(bitvec.get(0));
		assert!(!bitvec.get(1));
		assert!(bitvec.get(2));
	}

	#[test]
	fn test_from_slice() {
		let bitvec = BitVec::from_slice(&[true, false, true, false]);
		assert_eq!(bitvec.len(), 4);
		assert_eq!(bitvec.count_ones(), 2);
	}

	#[test]
	fn test_crosses_word_boundary() {
		let mut bitvec = BitVec::new();
		for i in 0..130 {
			bitvec.push(i % 3 == 0);
		}

		assert_eq!(bitvec.len(), 130);
		for i in 0..130 {
			assert_eq!(bitvec.get(i), i % 3 == 0, "bit {i}");
		}
		assert_eq!(bitvec.count_ones(), (0..130).filter(|i| i % 3 == 0).count());
	}

	#[test]
	fn test_set() {
		let mut bitvec = BitVec::from_slice(&[false, false]);
		bitvec.set(1, true);
		assert!(!bitvec.get(0));
		assert!(bitvec.get(1));

		bitvec.set(1, false);
		assert_eq!(bitvec.count_ones(), 0);
	}

	#[test]
	fn test_iter() {
		let bits = [true, true, false, true];
		let bitvec = BitVec::from_slice(&bits);
		let collected: Vec<bool> = bitvec.iter().collect();
		assert_eq!(collected, bits);
	}

	#[test]
	#[should_panic(expected = "out of bounds")]
	fn test_get_out_of_bounds() {
		BitVec::new().get(0);
	}
}
