use chrono::{Datelike, Duration, Months, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::classify::custom_rules::CompiledStrategy;
use crate::classify::patterns::SemanticType;
use crate::config::settings::FillConfig;
use crate::error::GenerateError;
use crate::field::field_model::{ControlConstraints, ControlKind, FieldDescriptor};
use crate::generate::locale::{LocaleData, ascii_fold};
use crate::generate::value::{FileBlob, GeneratedValue};

pub const PASSWORD_LEN: usize = 12;
pub const MAX_FILE_BYTES: usize = 1024;

// ============================================================================
// Named generator references
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorRef {
    FirstName,
    LastName,
    FullName,
    Email,
    Username,
    Url,
    Password,
    Phone,
    Street,
    City,
    State,
    Zip,
    Country,
    CompanyName,
    Birthdate,
    RecentDate,
    Iban,
    CreditCard,
    Cvv,
    Amount,
    Sentence,
    Paragraph,
}

const GENERATOR_PATHS: &[(&str, GeneratorRef)] = &[
    ("person.firstName", GeneratorRef::FirstName),
    ("person.lastName", GeneratorRef::LastName),
    ("person.fullName", GeneratorRef::FullName),
    ("internet.email", GeneratorRef::Email),
    ("internet.username", GeneratorRef::Username),
    ("internet.url", GeneratorRef::Url),
    ("internet.password", GeneratorRef::Password),
    ("phone.number", GeneratorRef::Phone),
    ("address.street", GeneratorRef::Street),
    ("address.city", GeneratorRef::City),
    ("address.state", GeneratorRef::State),
    ("address.zip", GeneratorRef::Zip),
    ("address.country", GeneratorRef::Country),
    ("company.name", GeneratorRef::CompanyName),
    ("date.birthdate", GeneratorRef::Birthdate),
    ("date.recent", GeneratorRef::RecentDate),
    ("finance.iban", GeneratorRef::Iban),
    ("finance.creditCard", GeneratorRef::CreditCard),
    ("finance.cvv", GeneratorRef::Cvv),
    ("finance.amount", GeneratorRef::Amount),
    ("lorem.sentence", GeneratorRef::Sentence),
    ("lorem.paragraph", GeneratorRef::Paragraph),
];

impl GeneratorRef {
    /// Dotted path, case-insensitive.
    pub fn parse(path: &str) -> Result<Self, GenerateError> {
        let path = path.trim();
        GENERATOR_PATHS
            .iter()
            .find(|(p, _)| p.eq_ignore_ascii_case(path))
            .map(|(_, r)| *r)
            .ok_or_else(|| GenerateError::UnknownGenerator(path.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        GENERATOR_PATHS
            .iter()
            .find(|(_, r)| r == self)
            .map(|(p, _)| *p)
            .unwrap_or("unknown")
    }

    /// Semantic type producing the same value, `None` for lorem text.
    pub fn semantic(&self) -> Option<SemanticType> {
        Some(match self {
            GeneratorRef::FirstName => SemanticType::FirstName,
            GeneratorRef::LastName => SemanticType::LastName,
            GeneratorRef::FullName => SemanticType::FullName,
            GeneratorRef::Email => SemanticType::Email,
            GeneratorRef::Username => SemanticType::Username,
            GeneratorRef::Url => SemanticType::Website,
            GeneratorRef::Password => SemanticType::Password,
            GeneratorRef::Phone => SemanticType::Phone,
            GeneratorRef::Street => SemanticType::Street,
            GeneratorRef::City => SemanticType::City,
            GeneratorRef::State => SemanticType::State,
            GeneratorRef::Zip => SemanticType::PostalCode,
            GeneratorRef::Country => SemanticType::Country,
            GeneratorRef::CompanyName => SemanticType::Company,
            GeneratorRef::Birthdate => SemanticType::Birthdate,
            GeneratorRef::RecentDate => SemanticType::Date,
            GeneratorRef::Iban => SemanticType::Iban,
            GeneratorRef::CreditCard => SemanticType::CreditCard,
            GeneratorRef::Cvv => SemanticType::CardCvv,
            GeneratorRef::Amount => SemanticType::Amount,
            GeneratorRef::Sentence | GeneratorRef::Paragraph => return None,
        })
    }
}

// ============================================================================
// Value generator
// ============================================================================

/// Name pair shared by every person-related value of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonProfile {
    pub first_name: String,
    pub last_name: String,
}

/// Seeded, locale-aware source of field values for one pass.
#[derive(Debug)]
pub struct ValueGenerator {
    rng: StdRng,
    locale: &'static LocaleData,
    today: NaiveDate,
    age_range: (u32, u32),
    default_password: Option<String>,
    enable_file_input: bool,
    profile: Option<PersonProfile>,
}

impl ValueGenerator {
    pub fn new(config: &FillConfig, seed: Option<u64>, today: NaiveDate) -> Self {
        Self {
            rng: match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            },
            locale: LocaleData::resolve(&config.locale),
            today,
            age_range: config.age_range(),
            default_password: config.default_password.clone().filter(|p| !p.is_empty()),
            enable_file_input: config.enable_file_input,
            profile: None,
        }
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn locale(&self) -> &'static LocaleData {
        self.locale
    }

    pub fn profile(&mut self) -> PersonProfile {
        if let Some(p) = &self.profile {
            return p.clone();
        }
        let profile = PersonProfile {
            first_name: self.pick(self.locale.first_names),
            last_name: self.pick(self.locale.last_names),
        };
        self.profile = Some(profile.clone());
        profile
    }

    // ------------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------------

    /// Value for a field bound to a custom rule.
    pub fn for_rule(
        &mut self,
        strategy: &CompiledStrategy,
        field: &FieldDescriptor,
    ) -> Result<GeneratedValue, GenerateError> {
        match strategy {
            CompiledStrategy::List(items) => {
                let item = items.choose(&mut self.rng).ok_or(GenerateError::EmptyList)?;
                if field.control_kind == ControlKind::Checkbox {
                    if let Some(b) = parse_bool(item) {
                        return Ok(GeneratedValue::Boolean(b));
                    }
                }
                Ok(GeneratedValue::Text(item.clone()))
            }
            CompiledStrategy::Regex(template) => template.synthesize(&mut self.rng).map(GeneratedValue::Text),
            CompiledStrategy::Generator(r) => self.from_ref(*r, field),
        }
    }

    pub fn from_ref(&mut self, r: GeneratorRef, field: &FieldDescriptor) -> Result<GeneratedValue, GenerateError> {
        match (r.semantic(), r) {
            (Some(semantic), _) => self.for_semantic(semantic, field),
            (None, GeneratorRef::Paragraph) => Ok(GeneratedValue::Text(self.paragraph())),
            (None, _) => Ok(GeneratedValue::Text(self.sentence())),
        }
    }

    /// Value for a field of the given semantic type, shaped by its control.
    pub fn for_semantic(
        &mut self,
        semantic: SemanticType,
        field: &FieldDescriptor,
    ) -> Result<GeneratedValue, GenerateError> {
        match field.control_kind {
            ControlKind::File => return self.file_blob(field.constraints.accept.as_deref()).map(GeneratedValue::File),
            ControlKind::Checkbox => {
                let checked = field.constraints.required || self.rng.gen_bool(0.5);
                return Ok(GeneratedValue::Boolean(checked));
            }
            _ => {}
        }

        let value = match field.input_type.as_str() {
            "number" | "range" => GeneratedValue::Numeric(self.number(semantic, &field.constraints)),
            "date" => GeneratedValue::Text(self.date_for(semantic).format("%Y-%m-%d").to_string()),
            "datetime-local" => {
                let date = self.date_for(semantic);
                let (h, m) = (self.rng.gen_range(8..18), self.rng.gen_range(0..4) * 15);
                GeneratedValue::Text(format!("{}T{h:02}:{m:02}", date.format("%Y-%m-%d")))
            }
            "month" => GeneratedValue::Text(self.date_for(semantic).format("%Y-%m").to_string()),
            "time" => GeneratedValue::Text(format!("{:02}:{:02}", self.rng.gen_range(8..18), self.rng.gen_range(0..60))),
            "color" => GeneratedValue::Text(format!("#{:06x}", self.rng.gen_range(0..0x100_0000u32))),
            _ => GeneratedValue::Text(self.text_for(semantic, field.control_kind == ControlKind::Textarea)),
        };
        Ok(value)
    }

    /// Text value for a semantic type.
    pub fn text_for(&mut self, semantic: SemanticType, multiline: bool) -> String {
        let locale = self.locale;
        match semantic {
            SemanticType::Email => self.email(),
            SemanticType::Password => self.password(),
            SemanticType::Phone => {
                let format = self.pick_str(locale.phone_formats);
                self.pattern(format)
            }
            SemanticType::Website => format!("https://www.{}.{}", self.company_slug(), locale.tld),
            SemanticType::Birthdate => self.birthdate().format("%Y-%m-%d").to_string(),
            SemanticType::Age => {
                let (lo, hi) = self.age_range;
                self.rng.gen_range(lo..=hi).to_string()
            }
            SemanticType::Username => {
                let p = self.profile();
                let suffix = self.rng.gen_range(10..100);
                format!("{}{}{suffix}", ascii_fold(&p.first_name), ascii_fold(&p.last_name))
            }
            SemanticType::FirstName => self.profile().first_name,
            SemanticType::MiddleName => self.pick(locale.first_names),
            SemanticType::LastName => self.profile().last_name,
            SemanticType::FullName => {
                let p = self.profile();
                format!("{} {}", p.first_name, p.last_name)
            }
            SemanticType::Company => {
                let name = self.pick(locale.last_names);
                format!("{name} {}", self.pick_str(locale.company_suffixes))
            }
            SemanticType::JobTitle => self.pick(locale.job_titles),
            SemanticType::Salutation => self.pick(locale.salutations),
            SemanticType::Gender => self.pick(locale.genders),
            SemanticType::CreditCard => self.credit_card(),
            SemanticType::CardCvv => self.pattern("###"),
            SemanticType::CardExpiry => {
                let months = self.rng.gen_range(1..=48);
                let date = self.today.checked_add_months(Months::new(months)).unwrap_or(self.today);
                date.format("%m/%y").to_string()
            }
            SemanticType::Iban => self.iban(),
            SemanticType::RoomNumber => self.rng.gen_range(100..1000).to_string(),
            SemanticType::Building => format!("{} {}", locale.building_prefix, self.rng.gen_range(1..=30)),
            SemanticType::AddressLine2 => {
                let format = self.pick_str(locale.address_line2);
                self.pattern(format)
            }
            SemanticType::Street => {
                let street = self.pick_str(locale.streets);
                let number = self.rng.gen_range(1..=250).to_string();
                locale.street_format.replace("{street}", street).replace("{n}", &number)
            }
            SemanticType::City => self.pick(locale.cities),
            SemanticType::State => self.pick(locale.states),
            SemanticType::PostalCode => self.pattern(locale.postal_format),
            SemanticType::Country => locale.country.to_string(),
            SemanticType::Date => self.recent_date().format("%Y-%m-%d").to_string(),
            SemanticType::Amount => format!("{:.2}", self.rng.gen_range(1000..=500_000) as f64 / 100.0),
            SemanticType::Number => self.rng.gen_range(1..=100).to_string(),
            SemanticType::Search => self.pick(locale.words),
            SemanticType::Message if multiline => self.paragraph(),
            SemanticType::Message => self.sentence(),
            SemanticType::Custom | SemanticType::Text if multiline => self.sentence(),
            SemanticType::Custom | SemanticType::Text => {
                let words = self.words(2);
                capitalize(&words)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Structured values
    // ------------------------------------------------------------------------

    /// `first.last@domain`, consistent with the pass's names.
    pub fn email(&mut self) -> String {
        let p = self.profile();
        let domain = self.pick_str(self.locale.email_domains);
        let local = format!("{}.{}", ascii_fold(&p.first_name), ascii_fold(&p.last_name));
        if self.rng.gen_bool(0.5) {
            format!("{local}{}@{domain}", self.rng.gen_range(1..100))
        } else {
            format!("{local}@{domain}")
        }
    }

    /// The configured default, else upper, lower, digit and symbol mixed.
    pub fn password(&mut self) -> String {
        if let Some(p) = &self.default_password {
            return p.clone();
        }
        const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
        const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
        const DIGIT: &[u8] = b"23456789";
        const SYMBOL: &[u8] = b"!@#$%&*?-_";

        let mut chars: Vec<u8> = [UPPER, LOWER, DIGIT, SYMBOL]
            .iter()
            .map(|set| set[self.rng.gen_range(0..set.len())])
            .collect();
        let all: Vec<u8> = [UPPER, LOWER, DIGIT, SYMBOL].concat();
        while chars.len() < PASSWORD_LEN {
            chars.push(all[self.rng.gen_range(0..all.len())]);
        }
        chars.shuffle(&mut self.rng);
        chars.into_iter().map(char::from).collect()
    }

    /// A birth date whose age today lies within the configured bounds.
    pub fn birthdate(&mut self) -> NaiveDate {
        let (min_age, max_age) = self.age_range;
        let months_back = |years: u32| years.checked_mul(12).map(Months::new);
        let latest = months_back(min_age)
            .and_then(|m| self.today.checked_sub_months(m))
            .unwrap_or(self.today);
        let earliest = max_age
            .checked_add(1)
            .and_then(months_back)
            .and_then(|m| self.today.checked_sub_months(m))
            .and_then(|d| d.succ_opt())
            .unwrap_or(latest);
        let span = (latest - earliest).num_days().max(0);
        earliest + Duration::days(self.rng.gen_range(0..=span))
    }

    /// A date within the last year.
    pub fn recent_date(&mut self) -> NaiveDate {
        self.today - Duration::days(self.rng.gen_range(0..=365))
    }

    fn date_for(&mut self, semantic: SemanticType) -> NaiveDate {
        match semantic {
            SemanticType::Birthdate => self.birthdate(),
            SemanticType::CardExpiry => {
                let months = self.rng.gen_range(1..=48);
                self.today.checked_add_months(Months::new(months)).unwrap_or(self.today)
            }
            _ => self.recent_date(),
        }
    }

    /// Number inside the control's min/max/step and a type-specific default range.
    pub fn number(&mut self, semantic: SemanticType, c: &ControlConstraints) -> f64 {
        let (default_lo, default_hi, default_step) = match semantic {
            SemanticType::Age => (self.age_range.0 as f64, self.age_range.1 as f64, 1.0),
            SemanticType::Amount => (10.0, 5000.0, 0.01),
            _ => (1.0, 100.0, 1.0),
        };
        let mut lo = c.min.map_or(default_lo, |m| m.max(default_lo));
        let mut hi = c.max.map_or(default_hi, |m| m.min(default_hi));
        if lo > hi {
            lo = c.min.unwrap_or(default_lo);
            hi = c.max.unwrap_or(default_hi.max(lo));
        }
        if lo > hi {
            hi = lo;
        }

        let step = c.step.unwrap_or(default_step);
        let base = c.min.unwrap_or(0.0);
        let k_lo = ((lo - base) / step).ceil() as i64;
        let k_hi = ((hi - base) / step).floor() as i64;
        if k_lo > k_hi {
            return lo;
        }
        let k = self.rng.gen_range(k_lo..=k_hi);
        round_to(base + k as f64 * step, 10)
    }

    pub fn credit_card(&mut self) -> String {
        let mut digits = String::from("4");
        for _ in 0..14 {
            digits.push(self.digit());
        }
        let check = luhn_check_digit(&digits);
        digits.push(char::from(b'0' + check));
        digits
    }

    pub fn iban(&mut self) -> String {
        let country = self.locale.iban_country;
        let bban = self.pattern(self.locale.bban_format);
        let check = iban_check_digits(country, &bban);
        format!("{country}{check:02}{bban}")
    }

    /// Placeholder file matching an `accept` list, capped at `MAX_FILE_BYTES`.
    pub fn file_blob(&mut self, accept: Option<&str>) -> Result<FileBlob, GenerateError> {
        if !self.enable_file_input {
            return Err(GenerateError::FileDisabled);
        }
        let accept = accept.unwrap_or("").to_lowercase();
        let wants = |keys: &[&str]| keys.iter().any(|k| accept.contains(k));

        let (name, mime, bytes): (&str, &str, &[u8]) =
            if wants(&["image", ".png", ".jpg", ".jpeg", ".gif", ".webp"]) {
                ("placeholder.png", "image/png", PNG_1X1)
            } else if wants(&["pdf", "application", ".doc"]) || accept.is_empty() || accept.contains("*/*") {
                ("placeholder.pdf", "application/pdf", MINIMAL_PDF)
            } else if wants(&["text", ".txt", ".csv"]) {
                ("placeholder.txt", "text/plain", &b"placeholder\n"[..])
            } else {
                ("placeholder.pdf", "application/pdf", MINIMAL_PDF)
            };

        let mut bytes = bytes.to_vec();
        bytes.truncate(MAX_FILE_BYTES);
        Ok(FileBlob {
            name: name.to_string(),
            mime: mime.to_string(),
            bytes,
        })
    }

    // ------------------------------------------------------------------------
    // Lorem text
    // ------------------------------------------------------------------------

    pub fn sentence(&mut self) -> String {
        let n = self.rng.gen_range(6..=12);
        format!("{}.", capitalize(&self.words(n)))
    }

    pub fn paragraph(&mut self) -> String {
        let n = self.rng.gen_range(3..=5);
        (0..n).map(|_| self.sentence()).collect::<Vec<_>>().join(" ")
    }

    fn words(&mut self, n: usize) -> String {
        (0..n)
            .map(|_| self.pick_str(self.locale.words))
            .collect::<Vec<_>>()
            .join(" ")
    }

    // ------------------------------------------------------------------------
    // Sampling helpers
    // ------------------------------------------------------------------------

    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.gen_range(0..len))
    }

    fn pick(&mut self, items: &'static [&'static str]) -> String {
        self.pick_str(items).to_string()
    }

    fn pick_str(&mut self, items: &'static [&'static str]) -> &'static str {
        items.choose(&mut self.rng).copied().unwrap_or("")
    }

    fn digit(&mut self) -> char {
        char::from(b'0' + self.rng.gen_range(0..10u8))
    }

    /// `#` becomes a digit, `A` an uppercase letter.
    fn pattern(&mut self, format: &str) -> String {
        format
            .chars()
            .map(|c| match c {
                '#' => self.digit(),
                'A' if format.chars().all(|f| f == 'A' || f == '#') => {
                    char::from(b'A' + self.rng.gen_range(0..26u8))
                }
                other => other,
            })
            .collect()
    }

    fn company_slug(&mut self) -> String {
        ascii_fold(&self.pick(self.locale.last_names))
    }
}

// ============================================================================
// Free helpers
// ============================================================================

/// Whole years between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

pub fn luhn_check_digit(payload: &str) -> u8 {
    let sum: u32 = payload
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = (b - b'0') as u32;
            if i % 2 == 0 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

pub fn luhn_valid(number: &str) -> bool {
    match number.split_at_checked(number.len().saturating_sub(1)) {
        Some((payload, check)) if !payload.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) => {
            check.as_bytes()[0] - b'0' == luhn_check_digit(payload)
        }
        _ => false,
    }
}

fn mod97(digits: impl Iterator<Item = char>) -> u32 {
    digits.fold(0u32, |rem, c| match c.to_digit(36) {
        Some(v) if v >= 10 => (rem * 100 + v) % 97,
        Some(v) => (rem * 10 + v) % 97,
        None => rem,
    })
}

pub fn iban_check_digits(country: &str, bban: &str) -> u32 {
    let rearranged = format!("{bban}{country}00");
    98 - mod97(rearranged.chars())
}

pub fn iban_valid(iban: &str) -> bool {
    let compact: String = iban.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() < 5 || !compact.is_ascii() {
        return false;
    }
    let (head, tail) = compact.split_at(4);
    mod97(tail.chars().chain(head.chars())) == 1
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "checked" | "1" => Some(true),
        "false" | "off" | "no" | "unchecked" | "0" => Some(false),
        _ => None,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn round_to(v: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (v * factor).round() / factor
}

const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

const MINIMAL_PDF: &[u8] = b"%PDF-1.4\n1 0 obj<</Type/Catalog/Pages 2 0 R>>endobj\n2 0 obj<</Type/Pages/Kids[]/Count 0>>endobj\ntrailer<</Root 1 0 R>>\n%%EOF\n";
