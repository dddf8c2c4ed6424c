use serde_json::{Map, Value, json};

/// Primitive JSON type accepted for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Boolean => "boolean",
        }
    }
}

/// Where a parameter lands in the upstream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Integer(i64),
    Text(&'static str),
}

impl DefaultValue {
    fn to_json(self) -> Value {
        match self {
            DefaultValue::Integer(value) => json!(value),
            DefaultValue::Text(value) => json!(value),
        }
    }
}

/// Enumerated values advertised for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choices {
    Any,
    OneOf(&'static [&'static str]),
    /// The listed fields followed by every rating-category sort field.
    RatedFields(&'static [&'static str]),
}

impl Choices {
    pub fn values(&self) -> Option<Vec<String>> {
        match self {
            Choices::Any => None,
            Choices::OneOf(values) => Some(values.iter().map(|v| v.to_string()).collect()),
            Choices::RatedFields(leading) => {
                let mut values: Vec<String> = leading.iter().map(|v| v.to_string()).collect();
                for category in RATING_CATEGORIES {
                    for suffix in RATING_SUFFIXES {
                        values.push(format!("{category}_{suffix}"));
                    }
                }
                Some(values)
            }
        }
    }
}

pub const RATING_CATEGORIES: &[&str] = &[
    "overall",
    "cryptoFriendly",
    "customerService",
    "feesPricing",
    "digitalExperience",
    "securityTrust",
    "accountFeatures",
    "branchAtmAccess",
    "internationalBanking",
    "businessBanking",
    "processingSpeed",
    "transparency",
    "innovation",
    "investmentServices",
    "lending",
];

const RATING_SUFFIXES: &[&str] = &["score", "total", "up", "down"];

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub location: ParamLocation,
    pub default: Option<DefaultValue>,
    pub choices: Choices,
}

impl ParamSpec {
    const fn query(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::String,
            description,
            location: ParamLocation::Query,
            default: None,
            choices: Choices::Any,
        }
    }

    const fn path(name: &'static str, description: &'static str) -> Self {
        Self {
            location: ParamLocation::Path,
            ..Self::query(name, description)
        }
    }

    const fn kind(self, kind: ParamKind) -> Self {
        Self { kind, ..self }
    }

    const fn default(self, default: DefaultValue) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    const fn choices(self, choices: Choices) -> Self {
        Self { choices, ..self }
    }

    pub fn is_required(&self) -> bool {
        self.location == ParamLocation::Path
    }

    fn schema(&self) -> Value {
        let mut property = Map::new();
        property.insert("type".into(), json!(self.kind.as_str()));
        property.insert("description".into(), json!(self.description));
        if let Some(values) = self.choices.values() {
            property.insert("enum".into(), json!(values));
        }
        if let Some(default) = self.default {
            property.insert("default".into(), default.to_json());
        }
        Value::Object(property)
    }
}

/// One catalog entry: the descriptor exposed to the host plus the data the
/// dispatcher needs to build the upstream request.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Path template; `{name}` segments are filled from path parameters.
    pub path: &'static str,
    pub params: &'static [ParamSpec],
}

impl ToolSpec {
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|param| param.name == name)
    }

    pub fn path_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params
            .iter()
            .filter(|param| param.location == ParamLocation::Path)
    }

    pub fn query_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params
            .iter()
            .filter(|param| param.location == ParamLocation::Query)
    }

    /// JSON Schema object describing the tool input.
    pub fn input_schema(&self) -> Map<String, Value> {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|param| (param.name.to_string(), param.schema()))
            .collect();
        let required: Vec<&str> = self.path_params().map(|param| param.name).collect();

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
        schema
    }
}

pub fn find(name: &str) -> Option<&'static ToolSpec> {
    CATALOG.iter().find(|spec| spec.name == name)
}

const CATEGORIES_DESCRIPTION: &str = "An optional  comma-separated list of fields to include in the response. Possible values: `CRYPTO_FRIENDLY`, `CUSTOMER_SERVICE`, `FEES_PRICING`, `DIGITAL_EXPERIENCE`, `SECURITY_TRUST`, `ACCOUNT_FEATURES`, `BRANCH_ATM_ACCESS`, `INTERNATIONAL_BANKING`, `BUSINESS_BANKING`, `PROCESSING_SPEED`, `TRANSPARENCY`, `INNOVATION`, `INVESTMENT_SERVICES`, `LENDING`";

const LIMIT: ParamSpec = ParamSpec::query("limit", "Number of items to return.")
    .kind(ParamKind::Integer)
    .default(DefaultValue::Integer(10));

const STARTING_AFTER: ParamSpec = ParamSpec::query(
    "starting_after",
    "Cursor for forward pagination. Use the id of the last item from the previous page to get the next page.",
);

const ENDING_BEFORE: ParamSpec = ParamSpec::query(
    "ending_before",
    "Cursor for backward pagination. Use the id of the first item from the current page to get the previous page.",
);

const SORT_ORDER_ASC: ParamSpec =
    ParamSpec::query("sortOrder", "Sort order. Either ascending or descending.")
        .choices(Choices::OneOf(&["asc", "desc"]))
        .default(DefaultValue::Text("asc"));

const SORT_ORDER_DESC: ParamSpec = SORT_ORDER_ASC.default(DefaultValue::Text("desc"));

const COUNTRY_CODE: ParamSpec = ParamSpec::query(
    "countryCode",
    "The country's ISO 3166-1 code (2 characters).",
);

const BANK_ID: ParamSpec =
    ParamSpec::query("bankId", "The bank's auto-generated unique identifier.");

const INCLUDE_SCORES: ParamSpec = ParamSpec::query(
    "include",
    "An optional  comma-separated list of fields to include in the response. Possible values: `scores`",
);

const INCLUDE_SCORES_COUNTRY: ParamSpec = ParamSpec::query(
    "include",
    "An optional  comma-separated list of fields to include in the response. Possible values: `scores`, `country`",
);

const INCLUDE_BANK_COUNTRY: ParamSpec = ParamSpec::query(
    "include",
    "An optional  comma-separated list of fields to include in the response. Possible values: `bank`, `country`",
);

pub static CATALOG: [ToolSpec; 9] = [
    ToolSpec {
        name: "bank_get",
        description: "This endpoint allows you to retrieve a paginated list of all banks. By default, a maximum of ten banks are shown per page. You can search banks by name, filter by country and description (including null/not_null status or semantic content search using vector embeddings), sort them by various fields, and include related data like scores and country information. When searching description content, results are ordered by semantic similarity.",
        path: "/banks",
        params: &[
            LIMIT,
            STARTING_AFTER,
            ENDING_BEFORE,
            ParamSpec::query("search", "Search banks by name."),
            ParamSpec::query(
                "description",
                "Filter banks by description. Under the hood, this is a semantic search that uses vector embeddings, so you may get better results if you use general language. Besides a full text search, you can use \"null\" to return banks without descriptions or \"not_null\" to return banks with descriptions.",
            ),
            ParamSpec::query("sortBy", "Field to sort by.")
                .choices(Choices::RatedFields(&[
                    "name",
                    "rank",
                    "countryRank",
                    "storiesCount",
                    "countryId",
                ]))
                .default(DefaultValue::Text("name")),
            SORT_ORDER_ASC,
            ParamSpec::query(
                "include",
                "An optional  comma-separated list of fields to include in the response. Possible values: `scores`, `country`, `meta`",
            ),
            ParamSpec::query(
                "countryId",
                "Only return banks in the specified country. A country's ID is Moon Banking's unique identifier for the country.",
            ),
            ParamSpec::query(
                "countryCode",
                "Only return banks in the specified country. A country's code is the ISO 3166-1 code for the country. If both `countryId` and `countryCode` are provided, `countryId` will be used.",
            ),
        ],
    },
    ToolSpec {
        name: "bank_getById",
        description: "This endpoint allows you to retrieve a specific bank by providing the bank ID. You can include related data like scores and country information in the response.",
        path: "/banks/{id}",
        params: &[
            ParamSpec::path("id", "The bank's auto-generated unique identifier."),
            INCLUDE_SCORES_COUNTRY,
        ],
    },
    ToolSpec {
        name: "bankVote_get",
        description: "This endpoint allows you to retrieve a paginated list of bank votes. You can filter by bank ID, category, country, vote type (upvote or downvote), and other parameters.",
        path: "/bank-votes",
        params: &[
            LIMIT,
            STARTING_AFTER,
            ENDING_BEFORE,
            BANK_ID,
            ParamSpec::query("categories", CATEGORIES_DESCRIPTION),
            ParamSpec::query(
                "isUp",
                "Whether to filter for upvotes (true) or downvotes (false).",
            )
            .kind(ParamKind::Boolean),
            COUNTRY_CODE,
            ParamSpec::query("sortBy", "Field to sort by.")
                .choices(Choices::OneOf(&["createdAt"]))
                .default(DefaultValue::Text("createdAt")),
            SORT_ORDER_DESC,
            INCLUDE_BANK_COUNTRY,
        ],
    },
    ToolSpec {
        name: "bankVote_getById",
        description: "This endpoint allows you to retrieve a specific bank vote by providing the vote ID. You can include related data like bank and country information in the response.",
        path: "/bank-votes/{id}",
        params: &[
            ParamSpec::path("id", "The bank vote's auto-generated unique identifier."),
            INCLUDE_BANK_COUNTRY,
        ],
    },
    ToolSpec {
        name: "country_get",
        description: "This endpoint allows you to retrieve a paginated list of all countries. By default, a maximum of ten countries are shown per page. You can search countries by name or 2-letter code, sort them by various fields, and include related data like scores.",
        path: "/countries",
        params: &[
            LIMIT,
            STARTING_AFTER,
            ENDING_BEFORE,
            ParamSpec::query("search", "Search countries by name or 2-letter code."),
            ParamSpec::query("sortBy", "Field to sort by.")
                .choices(Choices::RatedFields(&[
                    "name",
                    "code",
                    "rank",
                    "banksCount",
                    "storiesCount",
                ]))
                .default(DefaultValue::Text("name")),
            SORT_ORDER_ASC,
            INCLUDE_SCORES,
        ],
    },
    ToolSpec {
        name: "country_getByCountryCode",
        description: "This endpoint allows you to retrieve a specific country by providing the 2-letter ISO country code. You can include related data like scores in the response.",
        path: "/countries/{code}",
        params: &[
            ParamSpec::path("code", "The country's ISO 3166-1 code (2 characters)."),
            INCLUDE_SCORES,
        ],
    },
    ToolSpec {
        name: "story_get",
        description: "This endpoint allows you to retrieve a paginated list of all stories. By default, a maximum of ten stories are shown per page. You can search stories by text content, filter by bank ID, sort them by various fields, and include related data like bank and country information.",
        path: "/stories",
        params: &[
            LIMIT,
            STARTING_AFTER,
            ENDING_BEFORE,
            ParamSpec::query("search", "Search stories by text content."),
            ParamSpec::query("sortBy", "Field to sort by.")
                .choices(Choices::OneOf(&["createdAt", "thumbsUpCount"]))
                .default(DefaultValue::Text("createdAt")),
            SORT_ORDER_ASC,
            INCLUDE_BANK_COUNTRY,
            COUNTRY_CODE,
            BANK_ID,
            ParamSpec::query("tags", CATEGORIES_DESCRIPTION),
        ],
    },
    ToolSpec {
        name: "story_getById",
        description: "This endpoint allows you to retrieve a specific story by providing the story ID. You can include related data like bank and country information in the response.",
        path: "/stories/{id}",
        params: &[
            ParamSpec::path("id", "The story's auto-generated unique identifier."),
            INCLUDE_BANK_COUNTRY,
        ],
    },
    ToolSpec {
        name: "world_getOverview",
        description: "This endpoint allows you to retrieve global overview data that aggregates banks votes, stories and other data across all banks in all countries. You can include related data like scores in the response.",
        path: "/world",
        params: &[INCLUDE_SCORES],
    },
];
