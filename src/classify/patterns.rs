use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Semantic types
// ============================================================================

/// Domain meaning of a field, independent of its HTML control type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SemanticType {
    Email,
    Password,
    Phone,
    Website,
    Birthdate,
    Age,
    Username,
    FirstName,
    MiddleName,
    LastName,
    Company,
    JobTitle,
    Salutation,
    FullName,
    Gender,
    CreditCard,
    CardCvv,
    CardExpiry,
    Iban,
    RoomNumber,
    Building,
    AddressLine2,
    Street,
    City,
    State,
    PostalCode,
    Country,
    Date,
    Amount,
    Number,
    Search,
    Message,
    /// Bound by a custom rule rather than a classifier.
    Custom,
    /// Generic type: nothing more specific was recognized.
    Text,
}

impl SemanticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Email => "email",
            SemanticType::Password => "password",
            SemanticType::Phone => "phone",
            SemanticType::Website => "website",
            SemanticType::Birthdate => "birthdate",
            SemanticType::Age => "age",
            SemanticType::Username => "username",
            SemanticType::FirstName => "first-name",
            SemanticType::MiddleName => "middle-name",
            SemanticType::LastName => "last-name",
            SemanticType::Company => "company",
            SemanticType::JobTitle => "job-title",
            SemanticType::Salutation => "salutation",
            SemanticType::FullName => "full-name",
            SemanticType::Gender => "gender",
            SemanticType::CreditCard => "credit-card",
            SemanticType::CardCvv => "card-cvv",
            SemanticType::CardExpiry => "card-expiry",
            SemanticType::Iban => "iban",
            SemanticType::RoomNumber => "room-number",
            SemanticType::Building => "building",
            SemanticType::AddressLine2 => "address-line2",
            SemanticType::Street => "street",
            SemanticType::City => "city",
            SemanticType::State => "state",
            SemanticType::PostalCode => "postal-code",
            SemanticType::Country => "country",
            SemanticType::Date => "date",
            SemanticType::Amount => "amount",
            SemanticType::Number => "number",
            SemanticType::Search => "search",
            SemanticType::Message => "message",
            SemanticType::Custom => "custom",
            SemanticType::Text => "text",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// Pattern library
// ============================================================================

/// One row of the ordered pattern table.
///
/// `input_types` and `autocomplete` are exact matches. `tokens` drive the
/// rule-based classifier; `hints` only add evidence for the confidence
/// scorer. When any `excludes` keyword appears in the field's identifiers,
/// placeholder or label, the row is skipped entirely.
#[derive(Debug)]
pub struct PatternEntry {
    pub semantic: SemanticType,
    pub input_types: &'static [&'static str],
    pub autocomplete: &'static [&'static str],
    pub tokens: &'static [&'static str],
    pub hints: &'static [&'static str],
    pub excludes: &'static [&'static str],
}

/// Rows in priority order. Earlier rows win within a tier and break
/// confidence ties. `RoomNumber` precedes `Building`, and both precede
/// `Street`, so "room / building" style fields resolve to the room.
pub static PATTERN_LIBRARY: &[PatternEntry] = &[
    PatternEntry {
        semantic: SemanticType::Email,
        input_types: &["email"],
        autocomplete: &["email"],
        tokens: &["email", "e mail", "mail"],
        hints: &["correo", "courriel", "e post", "mailadresse", "inbox"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::Password,
        input_types: &["password"],
        autocomplete: &["current-password", "new-password"],
        tokens: &["password", "passwd", "pwd", "pass"],
        hints: &["kennwort", "passwort", "contrasena", "passphrase", "secret"],
        excludes: &["passport"],
    },
    PatternEntry {
        semantic: SemanticType::Phone,
        input_types: &["tel"],
        autocomplete: &["tel", "tel-national", "tel-local"],
        tokens: &["phone", "tel", "telephone", "mobile", "cell", "phone number"],
        hints: &["telefon", "handy", "telefono", "whatsapp", "contact number", "cellular"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::Website,
        input_types: &["url"],
        autocomplete: &["url"],
        tokens: &["website", "url", "homepage", "web site"],
        hints: &["webseite", "site", "domain", "link", "blog"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::Birthdate,
        input_types: &[],
        autocomplete: &["bday"],
        tokens: &["birthdate", "birthday", "birth date", "date of birth", "dob", "bday"],
        hints: &["geburtsdatum", "naissance", "nacimiento", "born", "birth"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::Age,
        input_types: &[],
        autocomplete: &[],
        tokens: &["age", "your age"],
        hints: &["alter", "edad", "years old"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::Username,
        input_types: &[],
        autocomplete: &["username"],
        tokens: &["username", "user name", "login", "userid", "user id", "nickname", "screen name"],
        hints: &["benutzername", "benutzer", "handle", "account name", "alias"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::FirstName,
        input_types: &[],
        autocomplete: &["given-name"],
        tokens: &["first name", "firstname", "fname", "given name", "forename"],
        hints: &["vorname", "prenom", "nombre de pila", "first", "given"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::MiddleName,
        input_types: &[],
        autocomplete: &["additional-name"],
        tokens: &["middle name", "middlename", "mname", "middle initial"],
        hints: &["middle", "zweitname"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::LastName,
        input_types: &[],
        autocomplete: &["family-name"],
        tokens: &["last name", "lastname", "lname", "surname", "family name"],
        hints: &["nachname", "nom de famille", "apellido", "last", "family"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::Company,
        input_types: &[],
        autocomplete: &["organization"],
        tokens: &["company", "organization", "organisation", "employer", "business name"],
        hints: &["firma", "unternehmen", "entreprise", "empresa", "org", "corp"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::JobTitle,
        input_types: &[],
        autocomplete: &["organization-title"],
        tokens: &["job title", "jobtitle", "position", "occupation", "job"],
        hints: &["beruf", "profession", "role", "poste", "puesto"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::Salutation,
        input_types: &[],
        autocomplete: &["honorific-prefix"],
        tokens: &["salutation", "honorific", "name prefix"],
        hints: &["anrede", "civilite", "title", "tratamiento"],
        excludes: &["job"],
    },
    PatternEntry {
        semantic: SemanticType::FullName,
        input_types: &[],
        autocomplete: &["name"],
        tokens: &["full name", "fullname", "your name", "name", "contact name"],
        hints: &["vollstandiger name", "nom complet", "nombre", "naam"],
        excludes: &[
            "user", "company", "business", "file", "domain", "host", "product", "event",
            "street", "city", "account", "card", "bank", "pet", "team", "project",
        ],
    },
    PatternEntry {
        semantic: SemanticType::Gender,
        input_types: &[],
        autocomplete: &["sex"],
        tokens: &["gender", "sex"],
        hints: &["geschlecht", "genre", "sexo", "male", "female"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::CreditCard,
        input_types: &[],
        autocomplete: &["cc-number"],
        tokens: &["card number", "cardnumber", "credit card", "cc number", "ccnumber", "ccnum"],
        hints: &["kreditkarte", "carte", "tarjeta", "visa", "mastercard", "card"],
        excludes: &["id card", "gift card"],
    },
    PatternEntry {
        semantic: SemanticType::CardCvv,
        input_types: &[],
        autocomplete: &["cc-csc"],
        tokens: &["cvv", "cvc", "csc", "cvv2", "security code", "card code"],
        hints: &["prufnummer", "verification", "cryptogramme"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::CardExpiry,
        input_types: &[],
        autocomplete: &["cc-exp"],
        tokens: &["expiry", "expiration", "exp date", "card exp", "expires"],
        hints: &["ablaufdatum", "gultig bis", "valid thru", "vencimiento", "mm yy"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::Iban,
        input_types: &[],
        autocomplete: &[],
        tokens: &["iban"],
        hints: &["bank account", "account number", "kontonummer", "bankverbindung"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::RoomNumber,
        input_types: &[],
        autocomplete: &[],
        tokens: &["room", "room number", "roomno", "suite", "apt", "apartment", "unit"],
        hints: &["zimmer", "wohnung", "flat", "door", "appartement"],
        excludes: &["chat room", "showroom", "price", "cost"],
    },
    PatternEntry {
        semantic: SemanticType::Building,
        input_types: &[],
        autocomplete: &[],
        tokens: &["building", "bldg", "house number", "house no", "housenumber"],
        hints: &["gebaude", "hausnummer", "block", "tower", "edificio"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::AddressLine2,
        input_types: &[],
        autocomplete: &["address-line2"],
        tokens: &["address line 2", "address2", "addr2", "address 2", "line2"],
        hints: &["adresszusatz", "complement", "additional address"],
        excludes: &["email", "mail"],
    },
    PatternEntry {
        semantic: SemanticType::Street,
        input_types: &[],
        autocomplete: &["street-address", "address-line1"],
        tokens: &["street", "address", "addr", "address line 1", "address1"],
        hints: &["strasse", "adresse", "direccion", "rue", "calle", "road"],
        excludes: &["email", "mail", "ip", "web", "url", "wallet", "mac"],
    },
    PatternEntry {
        semantic: SemanticType::City,
        input_types: &[],
        autocomplete: &["address-level2"],
        tokens: &["city", "town", "locality"],
        hints: &["stadt", "ort", "ville", "ciudad", "municipality"],
        excludes: &["ethnicity", "capacity"],
    },
    PatternEntry {
        semantic: SemanticType::State,
        input_types: &[],
        autocomplete: &["address-level1"],
        tokens: &["state", "province", "region", "county"],
        hints: &["bundesland", "provincia", "prefecture", "departement"],
        excludes: &["statement", "estate"],
    },
    PatternEntry {
        semantic: SemanticType::PostalCode,
        input_types: &[],
        autocomplete: &["postal-code"],
        tokens: &["zip", "zipcode", "zip code", "postal code", "postcode", "postal", "plz"],
        hints: &["postleitzahl", "code postal", "codigo postal", "cep", "pin code"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::Country,
        input_types: &[],
        autocomplete: &["country", "country-name"],
        tokens: &["country", "nation"],
        hints: &["land", "pays", "pais", "staat"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::Date,
        input_types: &["date", "datetime-local"],
        autocomplete: &[],
        tokens: &["date"],
        hints: &["datum", "fecha", "day", "when"],
        excludes: &["birth", "dob", "bday", "born", "expiry", "expiration"],
    },
    PatternEntry {
        semantic: SemanticType::Amount,
        input_types: &[],
        autocomplete: &["transaction-amount"],
        tokens: &["amount", "price", "salary", "income", "budget", "cost"],
        hints: &["betrag", "preis", "total", "sum", "montant"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::Number,
        input_types: &[],
        autocomplete: &[],
        tokens: &["quantity", "qty", "number", "count"],
        hints: &["anzahl", "menge", "num", "how many"],
        excludes: &["phone", "card", "account", "house", "room", "tel", "vat", "tax"],
    },
    PatternEntry {
        semantic: SemanticType::Search,
        input_types: &["search"],
        autocomplete: &[],
        tokens: &["search", "query", "q"],
        hints: &["suche", "buscar", "recherche", "find", "keyword"],
        excludes: &[],
    },
    PatternEntry {
        semantic: SemanticType::Message,
        input_types: &[],
        autocomplete: &[],
        tokens: &["message", "comment", "comments", "description", "notes", "bio", "about"],
        hints: &["nachricht", "kommentar", "feedback", "details", "inquiry", "remarks"],
        excludes: &[],
    },
];

pub fn entry_for(semantic: SemanticType) -> Option<&'static PatternEntry> {
    PATTERN_LIBRARY.iter().find(|e| e.semantic == semantic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_semantic_type_appears_once() {
        let mut seen = HashSet::new();
        for entry in PATTERN_LIBRARY {
            assert!(seen.insert(entry.semantic), "duplicate {}", entry.semantic);
        }
    }

    #[test]
    fn room_number_is_declared_before_building() {
        let pos = |s| PATTERN_LIBRARY.iter().position(|e| e.semantic == s).unwrap();
        assert!(pos(SemanticType::RoomNumber) < pos(SemanticType::Building));
        assert!(pos(SemanticType::Building) < pos(SemanticType::Street));
        assert!(pos(SemanticType::Email) < pos(SemanticType::Street));
    }
}
