//! Codec configuration.
//!
//! A [`Config`] carries the three knobs that shape encoding and JSON scanning.
//! Entry points that need them are methods on [`Config`];
//! the free functions at the crate root use [`Config::default`].

macro_rules! config_accessors {
	($field:ident, $type:ty, $getter:ident, $mut_getter:ident, $setter:ident) => {
		pub fn $getter(&self) -> $type {
			self.$field
		}

		pub fn $mut_getter(&mut self) -> &mut $type {
			&mut self.$field
		}

		pub fn $setter(&mut self, value: $type) -> &mut Self {
			self.$field = value;
			self
		}
	};
}

/// How the JSON scanner turns numbers into CBOR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
	/// Numbers must be integers; fractions and exponents are rejected.
	IntNumber,
	/// Every number becomes a float64.
	FloatNumber,
	/// Numbers with a fraction or exponent become float64, the rest integers.
	SmartNumber,
}

/// Which characters the JSON scanner skips as white space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceKind {
	/// HT, LF, VT, FF, CR and SP.
	AnsiSpace,
	/// Any character with the Unicode `White_Space` property.
	UnicodeSpace,
}

/// How arrays and maps are encoded.
///
/// Decoding accepts both forms regardless.
/// The JSON scanner always emits the stream form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
	/// A header carrying the item count, followed by the items.
	LengthPrefix,
	/// The indefinite-length opener, the items, then a break.
	Stream,
}

/// Configuration for encoding and JSON scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	number_kind: NumberKind,
	space_kind: SpaceKind,
	container_kind: ContainerKind,
}

impl Config {
	pub fn new(number_kind: NumberKind, space_kind: SpaceKind, container_kind: ContainerKind) -> Self {
		Config {
			number_kind,
			space_kind,
			container_kind,
		}
	}

	config_accessors!(
		number_kind,
		NumberKind,
		number_kind,
		number_kind_mut,
		set_number_kind
	);

	config_accessors!(
		space_kind,
		SpaceKind,
		space_kind,
		space_kind_mut,
		set_space_kind
	);

	config_accessors!(
		container_kind,
		ContainerKind,
		container_kind,
		container_kind_mut,
		set_container_kind
	);
}

impl Default for Config {
	/// Return `(FloatNumber, UnicodeSpace, Stream)`.
	fn default() -> Self {
		Self::new(
			NumberKind::FloatNumber,
			SpaceKind::UnicodeSpace,
			ContainerKind::Stream,
		)
	}
}

/// Build a [`Config`] from its three options.
pub fn new_config(
	number_kind: NumberKind,
	space_kind: SpaceKind,
	container_kind: ContainerKind,
) -> Config {
	Config::new(number_kind, space_kind, container_kind)
}
