//! Free-text delivery addresses.
//!
//! Customers type addresses like `House 12, Road 5, Dhanmondi, Dhaka`. The
//! storefront keeps the full text as the street line and derives a city and
//! an area hint from the comma-separated segments.

/// City assumed when the address names none.
pub const DEFAULT_CITY: &str = "Dhaka";

/// Shortest address accepted at checkout.
pub const MIN_CHECKOUT_ADDRESS_LEN: usize = 8;

/// Longest area or city name stored (`VARCHAR(100)`).
pub const MAX_PLACE_NAME_LEN: usize = 100;

/// Cities recognised as the trailing segment of an address.
const KNOWN_CITIES: &[&str] = &[
    "dhaka",
    "chattogram",
    "chittagong",
    "sylhet",
    "khulna",
    "rajshahi",
    "barishal",
    "barisal",
    "rangpur",
    "mymensingh",
    "cumilla",
    "comilla",
    "gazipur",
    "narayanganj",
];

/// Leading words that mark a segment as part of the street line.
const STREET_WORDS: &[&str] = &[
    "house", "road", "flat", "apt", "apartment", "block", "sector", "lane", "plot", "holding",
    "level", "floor", "building", "bldg", "no", "h", "r",
];

/// A parsed free-text address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressText {
    pub street: String,
    pub city: String,
    /// Name a new area would get when no known area matches. Never a
    /// house/road/flat part; falls back to the city.
    pub area_hint: String,
}

impl AddressText {
    /// Parse a raw address. Returns `None` when the input is blank.
    ///
    /// ```
    /// use chaldal_core::address::AddressText;
    ///
    /// let addr = AddressText::parse("House 12, Road 5, Dhanmondi, Dhaka").unwrap();
    /// assert_eq!(addr.city, "Dhaka");
    /// assert_eq!(addr.area_hint, "Dhanmondi");
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let street = raw.trim();
        if street.is_empty() {
            return None;
        }

        let segments: Vec<&str> = street
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        let (city, rest) = match segments.as_slice() {
            [rest @ .., last] if !rest.is_empty() && is_known_city(last) => (*last, rest),
            all => (DEFAULT_CITY, all),
        };

        let area_hint = match rest {
            [single] => place_words(single),
            many => many
                .iter()
                .rev()
                .find(|segment| !is_street_part(segment))
                .map(|segment| (*segment).to_owned()),
        }
        .unwrap_or_else(|| city.to_owned());

        Some(Self {
            street: street.to_owned(),
            city: cap_len(city),
            area_hint: cap_len(&area_hint),
        })
    }

    /// Whether the text is long enough to deliver to.
    #[must_use]
    pub fn is_deliverable(&self) -> bool {
        self.street.chars().count() >= MIN_CHECKOUT_ADDRESS_LEN
    }
}

fn is_known_city(segment: &str) -> bool {
    KNOWN_CITIES.contains(&segment.to_lowercase().as_str())
}

fn is_street_word(word: &str) -> bool {
    let word = word.trim_end_matches(['.', ':', '#']).to_lowercase();
    STREET_WORDS.contains(&word.as_str())
}

/// A segment like `House 12`, `Road 5/A` or `12/3`.
fn is_street_part(segment: &str) -> bool {
    segment
        .split_whitespace()
        .next()
        .is_none_or(|first| first.starts_with(|c: char| c.is_ascii_digit()) || is_street_word(first))
}

/// First run of plain words that are not street markers, e.g.
/// `House 12 Road 5 Dhanmondi` -> `Dhanmondi`, `Mirpur 10 near stadium` -> `Mirpur`.
fn place_words(text: &str) -> Option<String> {
    let words: Vec<&str> = text
        .split_whitespace()
        .skip_while(|w| !is_place_word(w))
        .take_while(|w| is_place_word(w))
        .collect();
    (!words.is_empty()).then(|| words.join(" "))
}

fn is_place_word(word: &str) -> bool {
    word.chars().all(char::is_alphabetic) && !is_street_word(word)
}

fn cap_len(name: &str) -> String {
    name.chars().take(MAX_PLACE_NAME_LEN).collect::<String>().trim_end().to_owned()
}

/// Lowercased alphanumeric tokens.
fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Find the area whose name appears in `text` as whole words, ignoring case.
///
/// `Road 2` does not match `Road 21`, and `Ramna` does not match `Ramnagar`.
/// When several names match, the longest wins so that `Mirpur DOHS` beats
/// `Mirpur`.
pub fn match_area<'a, T>(areas: &'a [T], text: &str, name: impl Fn(&T) -> &str) -> Option<&'a T> {
    let haystack = tokens(text);
    areas
        .iter()
        .filter(|area| {
            let needle = tokens(name(*area));
            !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle.as_slice())
        })
        .max_by_key(|area| name(*area).trim().chars().count())
}
