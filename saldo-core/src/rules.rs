//! The shared category rule table.
//!
//! One ordered list of keyword groups, evaluated first-match-wins over the
//! lower-cased description. Both the ingestion-time classifier and the batch
//! re-categorizer consume this table, and a custom table can be loaded from
//! JSON, so bank-specific vocabulary grows without touching control flow.
//! Ordering is part of the contract: specific groups (fuel) sit before the
//! broad catch-alls (generic transport, generic shopping).

use serde::{Deserialize, Serialize};

/// Category for descriptions no group claims.
pub const DEFAULT_CATEGORY: &str = "Otros gastos";
/// Internal transfers; rows in this category are excluded from totals.
pub const TRANSFER_CATEGORY: &str = "Transferencias";
/// Credit-card refunds. Assigned by the ingestion pipeline, never by the
/// table itself.
pub const REFUND_CATEGORY: &str = "Reembolsos";

/// Secondary split inside a matched group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubRule {
    pub any: Vec<String>,
    pub category: String,
}

/// One keyword group. Matches when the description contains any keyword;
/// sub-rules are tried in order before falling back to `category`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleGroup {
    pub any: Vec<String>,
    #[serde(default)]
    pub sub: Vec<SubRule>,
    pub category: String,
}

/// Ordered rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub groups: Vec<RuleGroup>,
}

impl RuleSet {
    /// Map a description to a category. Total: falls back to
    /// [`DEFAULT_CATEGORY`], never fails.
    pub fn classify(&self, description: &str) -> &str {
        let desc = description.to_lowercase();
        for group in &self.groups {
            if !group.any.iter().any(|k| desc.contains(k.as_str())) {
                continue;
            }
            for sub in &group.sub {
                if sub.any.iter().any(|k| desc.contains(k.as_str())) {
                    return &sub.category;
                }
            }
            return &group.category;
        }
        DEFAULT_CATEGORY
    }

    /// The built-in table for Spanish bank vocabulary.
    pub fn builtin() -> RuleSet {
        RuleSet {
            groups: vec![
                // Salary / income
                group(
                    &["nomina", "nómina", "salario", "salary", "sueldo", "payroll"],
                    "Salary",
                ),
                // Supermarkets
                group(
                    &[
                        "mercadona", "carrefour", "lidl", "aldi", "dia %", "dia ",
                        "alcampo", "eroski", "consum", "supermarket", "supermercado",
                        "hipermercado", "ahorra mas", "ahorramás", "condis", "bonpreu",
                        "esclat", "gadis", "hiber", "simple", "mas y mas", "masymas",
                        "alimentacion", "grocery",
                    ],
                    "Supermercado",
                ),
                // Restaurants and bars
                group(
                    &[
                        "restaurante", "restaurant", "mcdonald", "burger king", "kfc",
                        "subway", "domino", "pizza", "telepizza", "bar ", "cafeteria",
                        "cafe ", "coffee", "starbucks", "dunkin", "taco bell",
                        "five guys", "pans", "kebab", "sushi", "comida rapida",
                        "fast food", "food", "eat", "dinner", "lunch", "breakfast",
                        "poke", "wok", "ramen", "tapas", "gastro", "taberna",
                        "cerveceria", "parrilla", "asador", "marisqueria", "pizzeria",
                        "hamburgueseria",
                    ],
                    "Restaurante",
                ),
                // Transport, with fuel and parking split out first
                group_with(
                    &[
                        "uber", "cabify", "taxi", "gasolina", "gasolinera", "repsol",
                        "cepsa", "shell", "bp ", "galp", "petrol", "fuel", "parking",
                        "aparcamiento", "peaje", "toll", "renfe", "metro", "tmb",
                        "emt", "bus", "transporte", "transport", "blablacar", "bolt",
                        "freenow", "lyft",
                    ],
                    vec![
                        sub(
                            &["gasolina", "gasolinera", "repsol", "cepsa", "shell", "galp"],
                            "Gasolina",
                        ),
                        sub(&["parking", "aparcamiento", "peaje"], "Parking y peaje"),
                    ],
                    "Transportes",
                ),
                // Clothing
                group(
                    &[
                        "zara", "h&m", "mango", "pull&bear", "bershka", "stradivarius",
                        "massimo dutti", "primark", "decathlon", "nike", "adidas",
                        "deportes", "sport", "ropa", "clothes", "clothing", "fashion",
                        "boutique", "zapateria", "shoes", "calzado", "lefties",
                        "kiabi", "c&a", "corte ingles moda", "springfield",
                    ],
                    "Ropa",
                ),
                // Home and electronics share one vocabulary
                group_with(
                    &[
                        "ikea", "leroy merlin", "bricomart", "aki", "bauhaus", "brico",
                        "hogar", "home", "muebles", "furniture", "deco", "media markt",
                        "mediamarkt", "fnac", "apple", "samsung", "worten",
                        "pccomponentes", "pc componentes", "electro", "electronica",
                        "electronics", "technology",
                    ],
                    vec![sub(&["ikea", "leroy", "muebles"], "Hogar")],
                    "Electrónica",
                ),
                // Online marketplaces
                group(
                    &[
                        "amazon", "ebay", "aliexpress", "ali express", "paypal",
                        "wallapop", "vinted", "etsy", "wish", "shein", "asos",
                        "zalando", "pccomponentes", "coolmod", "online shop",
                        "tienda online", "compra online",
                    ],
                    "Servicios y productos online",
                ),
                // Health
                group_with(
                    &[
                        "farmacia", "pharmacy", "parafarmacia", "optica", "dentist",
                        "medic", "doctor", "clinic", "hospital", "sanitarium",
                        "health", "salud",
                    ],
                    vec![
                        sub(&["farmacia", "pharmacy"], "Farmacia"),
                        sub(&["optica", "dentist"], "Óptica y dentista"),
                    ],
                    "Médico",
                ),
                // Beauty
                group(
                    &[
                        "peluqueria", "hairdresser", "salon", "barberia", "barber",
                        "estetica", "beauty", "belleza", "spa", "masaje", "massage",
                        "cosmetica", "cosmetics", "perfumeria", "sephora", "douglas",
                        "primor",
                    ],
                    "Belleza",
                ),
                // Books and stationery
                group(
                    &[
                        "libreria", "bookstore", "books", "casa del libro",
                        "papeleria", "stationery", "abacus", "raima",
                    ],
                    "Librería",
                ),
                // Subscriptions
                group(
                    &[
                        "spotify", "netflix", "hbo", "amazon prime", "disney",
                        "apple music", "youtube premium", "twitch", "subscription",
                        "suscripcion", "xbox", "playstation", "nintendo", "steam",
                        "epic games", "microsoft 365", "adobe", "dropbox", "icloud",
                        "google one",
                    ],
                    "Servicios y productos online",
                ),
                // Utilities
                group(
                    &[
                        "endesa", "iberdrola", "naturgy", "gas natural",
                        "electricidad", "electricity", "luz", "power", "energia",
                    ],
                    "Electricidad",
                ),
                group_with(
                    &[
                        "vodafone", "movistar", "orange", "yoigo", "masmovil",
                        "jazztel", "telefonica", "internet", "fibra", "wifi", "adsl",
                    ],
                    vec![sub(&["movil", "mobile", "phone"], "Móvil")],
                    "Internet",
                ),
                group(
                    &["agua", "water", "canal isabel", "aigues", "agbar"],
                    "Agua",
                ),
                // Housing
                group(
                    &["alquiler", "rent", "inmobiliaria", "real estate", "arrendamiento"],
                    "Alquiler y compra",
                ),
                group(&["comunidad", "community", "building fees"], "Comunidad"),
                group(
                    &["hipoteca", "mortgage", "prestamo hipotecario"],
                    "Hipoteca",
                ),
                // Insurance
                group_with(
                    &[
                        "seguro", "insurance", "axa", "mapfre", "mutua", "sanitas",
                        "adeslas", "asisa", "dkv",
                    ],
                    vec![
                        sub(&["auto", "coche", "vehiculo"], "Seguro auto"),
                        sub(&["salud", "health", "sanitas", "adeslas"], "Seguro salud"),
                        sub(&["hogar", "home", "casa"], "Seguro hogar"),
                    ],
                    "Otros seguros",
                ),
                // Bank fees
                group(
                    &[
                        "comision", "commission", "fee", "cargo", "mantenimiento",
                        "maintenance",
                    ],
                    "Cargos bancarios",
                ),
                // Taxes
                group(
                    &[
                        "hacienda", "impuesto", "tax", "iva", "irpf", "tribut",
                        "agencia tributaria", "modelo ",
                    ],
                    "Impuestos",
                ),
                // Loans
                group(
                    &[
                        "prestamo", "loan", "credito", "credit", "financiacion",
                        "financing",
                    ],
                    "Préstamos",
                ),
                // Transfers, including fintech wallets
                group(
                    &[
                        "traspaso", "transferencia", "transfer", "envio", "bizum",
                        "paypal envio", "revolut", "n26", "verse", "wise",
                    ],
                    TRANSFER_CATEGORY,
                ),
                // Cash
                group(
                    &["cajero", "atm", "efectivo", "cash", "reintegro", "withdrawal"],
                    "Efectivo",
                ),
                // Entertainment
                group(
                    &[
                        "cine", "cinema", "teatro", "theatre", "concierto", "concert",
                        "entradas", "tickets", "espectaculo",
                    ],
                    "Espectáculos",
                ),
                group(
                    &[
                        "hotel", "resort", "vacation", "vacaciones", "viaje",
                        "travel", "vuelo", "flight",
                    ],
                    "Vacaciones",
                ),
                group(
                    &["ocio", "parque", "zoo", "entretenimiento"],
                    "Entretenimiento",
                ),
                // Education
                group(
                    &[
                        "universidad", "university", "colegio", "school", "academia",
                        "curso", "course", "matricula", "estudios", "education",
                        "formacion",
                    ],
                    "Estudios",
                ),
                // Sports
                group(
                    &[
                        "gimnasio", "gym", "fitness", "sport", "club deportivo",
                        "piscina", "yoga", "pilates", "crossfit",
                    ],
                    "Deporte",
                ),
                // Vehicle maintenance
                group(
                    &[
                        "taller", "garage", "mecanico", "mechanic", "reparacion",
                        "repair", "itv", "lavado", "car wash",
                    ],
                    "Mantenimiento vehículo",
                ),
                // Generic shopping, kept last before the default
                group(
                    &["compra", "purchase", "shop", "store", "tienda"],
                    "Otras compras",
                ),
            ],
        }
    }
}

fn keywords(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn group(any: &[&str], category: &str) -> RuleGroup {
    RuleGroup {
        any: keywords(any),
        sub: Vec::new(),
        category: category.to_string(),
    }
}

fn group_with(any: &[&str], sub: Vec<SubRule>, category: &str) -> RuleGroup {
    RuleGroup {
        any: keywords(any),
        sub,
        category: category.to_string(),
    }
}

fn sub(any: &[&str], category: &str) -> SubRule {
    SubRule {
        any: keywords(any),
        category: category.to_string(),
    }
}
