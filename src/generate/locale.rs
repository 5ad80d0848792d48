/// Data tables a locale contributes to value generation.
///
/// Formats use `#` for a random digit. Street formats use `{street}` and
/// `{n}` placeholders.
#[derive(Debug)]
pub struct LocaleData {
    pub code: &'static str,
    pub first_names: &'static [&'static str],
    pub last_names: &'static [&'static str],
    pub streets: &'static [&'static str],
    pub street_format: &'static str,
    pub address_line2: &'static [&'static str],
    pub building_prefix: &'static str,
    pub cities: &'static [&'static str],
    pub states: &'static [&'static str],
    pub country: &'static str,
    pub postal_format: &'static str,
    pub phone_formats: &'static [&'static str],
    pub company_suffixes: &'static [&'static str],
    pub job_titles: &'static [&'static str],
    pub email_domains: &'static [&'static str],
    pub tld: &'static str,
    pub genders: &'static [&'static str],
    pub salutations: &'static [&'static str],
    /// Country code and BBAN format for IBANs; `A` is a random letter.
    pub iban_country: &'static str,
    pub bban_format: &'static str,
    pub words: &'static [&'static str],
}

pub static EN: LocaleData = LocaleData {
    code: "en",
    first_names: &[
        "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
        "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
        "Daniel", "Karen", "Emily", "Matthew", "Olivia", "Andrew",
    ],
    last_names: &[
        "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Wilson",
        "Anderson", "Taylor", "Thomas", "Moore", "Martin", "Jackson", "Thompson", "White", "Harris",
        "Clark", "Lewis",
    ],
    streets: &[
        "Main Street", "Oak Avenue", "Maple Drive", "Cedar Lane", "Park Road", "Elm Street",
        "Washington Boulevard", "Lakeview Drive", "Hillcrest Road", "Sunset Avenue",
    ],
    street_format: "{n} {street}",
    address_line2: &["Apt #", "Suite ##", "Unit #", "Floor #"],
    building_prefix: "Building",
    cities: &[
        "Springfield", "Portland", "Austin", "Denver", "Columbus", "Madison", "Boston", "Seattle",
        "Phoenix", "Raleigh",
    ],
    states: &[
        "California", "Texas", "New York", "Oregon", "Colorado", "Ohio", "Wisconsin", "Washington",
        "Arizona", "North Carolina",
    ],
    country: "United States",
    postal_format: "#####",
    phone_formats: &["(###) ###-####", "###-###-####", "+1 ### ### ####"],
    company_suffixes: &["Inc.", "LLC", "Group", "Corp.", "& Sons", "Partners"],
    job_titles: &[
        "Software Engineer", "Project Manager", "Sales Representative", "Accountant",
        "Product Designer", "Operations Analyst", "Marketing Coordinator", "Customer Success Manager",
    ],
    email_domains: &["example.com", "example.org", "example.net"],
    tld: "com",
    genders: &["female", "male", "other"],
    salutations: &["Mr.", "Ms.", "Mrs.", "Dr."],
    iban_country: "GB",
    bban_format: "AAAA##############",
    words: &[
        "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
        "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
        "minim", "veniam", "quis", "nostrud",
    ],
};

pub static DE: LocaleData = LocaleData {
    code: "de",
    first_names: &[
        "Lukas", "Anna", "Leon", "Marie", "Finn", "Sophie", "Jonas", "Lena", "Paul", "Emma", "Felix",
        "Mia", "Maximilian", "Hannah", "Jürgen", "Jörg", "Sabine", "Katrin",
    ],
    last_names: &[
        "Müller", "Schmidt", "Schneider", "Fischer", "Weber", "Meyer", "Wagner", "Becker", "Schulz",
        "Hoffmann", "Schäfer", "Koch", "Bauer", "Richter", "Klein", "Wolf",
    ],
    streets: &[
        "Hauptstraße", "Schulstraße", "Gartenstraße", "Bahnhofstraße", "Dorfstraße", "Bergstraße",
        "Lindenweg", "Kirchplatz", "Am Markt", "Waldweg",
    ],
    street_format: "{street} {n}",
    address_line2: &["Wohnung #", "Hinterhaus", "#. OG", "c/o Familie Meyer"],
    building_prefix: "Haus",
    cities: &[
        "Berlin", "Hamburg", "München", "Köln", "Frankfurt am Main", "Stuttgart", "Düsseldorf",
        "Leipzig", "Dresden", "Bremen",
    ],
    states: &[
        "Bayern", "Berlin", "Hamburg", "Hessen", "Sachsen", "Niedersachsen", "Nordrhein-Westfalen",
        "Baden-Württemberg", "Bremen", "Thüringen",
    ],
    country: "Deutschland",
    postal_format: "#####",
    phone_formats: &["+49 ### #######", "0### #######", "+49 1## ########"],
    company_suffixes: &["GmbH", "AG", "KG", "GmbH & Co. KG", "e.K."],
    job_titles: &[
        "Softwareentwickler", "Projektleiterin", "Vertriebsmitarbeiter", "Buchhalterin",
        "Produktdesigner", "Sachbearbeiter", "Marketingreferentin",
    ],
    email_domains: &["beispiel.de", "example.de", "muster.de"],
    tld: "de",
    genders: &["weiblich", "männlich", "divers"],
    salutations: &["Herr", "Frau", "Dr."],
    iban_country: "DE",
    bban_format: "##################",
    words: &[
        "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
        "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua",
    ],
};

static LOCALES: &[&LocaleData] = &[&EN, &DE];

impl LocaleData {
    /// Exact or language-prefix match (`de-AT` → `de`).
    pub fn for_code(code: &str) -> Option<&'static LocaleData> {
        let code = code.trim().to_lowercase().replace('_', "-");
        let lang = code.split('-').next().unwrap_or("");
        LOCALES.iter().copied().find(|l| l.code == code || l.code == lang)
    }

    /// Falls back to English.
    pub fn resolve(code: &str) -> &'static LocaleData {
        Self::for_code(code).unwrap_or(&EN)
    }
}

/// ASCII form of a name for use in emails and usernames.
pub fn ascii_fold(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            'ä' | 'Ä' => out.push_str("ae"),
            'ö' | 'Ö' => out.push_str("oe"),
            'ü' | 'Ü' => out.push_str("ue"),
            'ß' => out.push_str("ss"),
            'é' | 'è' | 'ê' => out.push('e'),
            c if c.is_ascii_alphanumeric() => out.push(c.to_ascii_lowercase()),
            _ => {}
        }
    }
    out
}
