use {
    super::{
        AuctionError,
        FieldViolation,
    },
    std::{
        fmt,
        str::FromStr,
        time::Duration,
    },
    strum::{
        AsRefStr,
        Display,
        EnumString,
    },
    time::{
        Date,
        OffsetDateTime,
    },
    uuid::Uuid,
};

pub type AuctionId = Uuid;

pub const PRODUCT_NAME_MIN_LENGTH: usize = 2;
pub const CATEGORY_MIN_LENGTH: usize = 2;
pub const DESCRIPTION_MIN_LENGTH: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ProductCondition {
    New,
    Used,
    Refurbished,
}

impl ProductCondition {
    /// Numeric codes kept for clients that still send the legacy integer form.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(ProductCondition::New),
            2 => Some(ProductCondition::Used),
            3 => Some(ProductCondition::Refurbished),
            _ => None,
        }
    }

    /// Accepts either the condition name or its numeric code.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        ProductCondition::from_str(raw)
            .ok()
            .or_else(|| raw.parse::<i32>().ok().and_then(ProductCondition::from_code))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum AuctionStatus {
    Active,
    Completed,
}

impl AuctionStatus {
    /// The lifecycle has a single edge: Active -> Completed.
    pub fn can_transition_to(&self, next: AuctionStatus) -> bool {
        matches!(
            (*self, next),
            (AuctionStatus::Active, AuctionStatus::Completed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AuctionStatus::Completed)
    }
}

/// Progress of the delayed close for a single auction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum AutoCloseState {
    /// The store confirmed creation and the timer is sleeping
    Scheduled,
    /// The interval elapsed and the close was issued to the store
    Fired,
    /// The store answered the close, successfully or not
    Acknowledged,
}

/// Raw, unvalidated input for a new auction.
#[derive(Clone, Debug, Default)]
pub struct AuctionCreate {
    pub product_name: String,
    pub category:     String,
    pub description:  String,
    pub condition:    String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Auction {
    pub id:              AuctionId,
    pub product_name:    String,
    pub category:        String,
    pub description:     String,
    pub condition:       ProductCondition,
    pub status:          AuctionStatus,
    pub creation_time:   OffsetDateTime,
    pub completion_time: Option<OffsetDateTime>,
}

fn check_length(
    violations: &mut Vec<FieldViolation>,
    field: &'static str,
    value: &str,
    min_length: usize,
) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        violations.push(FieldViolation::new(field, "must not be empty"));
    } else if trimmed.chars().count() < min_length {
        violations.push(FieldViolation::new(
            field,
            format!("must have at least {} characters", min_length),
        ));
    }
}

impl Auction {
    pub fn try_new(input: AuctionCreate) -> Result<Self, AuctionError> {
        let mut violations = vec![];
        check_length(
            &mut violations,
            "product_name",
            &input.product_name,
            PRODUCT_NAME_MIN_LENGTH,
        );
        check_length(
            &mut violations,
            "category",
            &input.category,
            CATEGORY_MIN_LENGTH,
        );
        check_length(
            &mut violations,
            "description",
            &input.description,
            DESCRIPTION_MIN_LENGTH,
        );
        let condition = ProductCondition::parse(&input.condition);
        if condition.is_none() {
            violations.push(FieldViolation::new(
                "condition",
                format!("unknown condition {:?}", input.condition),
            ));
        }

        match condition {
            Some(condition) if violations.is_empty() => Ok(Self {
                id: Uuid::new_v4(),
                product_name: input.product_name,
                category: input.category,
                description: input.description,
                condition,
                status: AuctionStatus::Active,
                creation_time: OffsetDateTime::now_utc(),
                completion_time: None,
            }),
            _ => Err(AuctionError::Validation(violations)),
        }
    }

    /// Saturates at the largest representable date for intervals that overflow it.
    pub fn deadline(&self, interval: Duration) -> OffsetDateTime {
        time::Duration::try_from(interval)
            .ok()
            .and_then(|interval| self.creation_time.checked_add(interval))
            .unwrap_or_else(|| Date::MAX.midnight().assume_utc())
    }

    pub fn is_expired(&self, interval: Duration, now: OffsetDateTime) -> bool {
        self.status == AuctionStatus::Active && self.deadline(interval) <= now
    }

    /// Time left until the deadline, zero once it has passed.
    pub fn time_until_deadline(&self, interval: Duration, now: OffsetDateTime) -> Duration {
        Duration::try_from(self.deadline(interval) - now).unwrap_or(Duration::ZERO)
    }
}

impl fmt::Display for Auction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Auction {{ id: {}, product_name: {:?}, status: {} }}",
            self.id, self.product_name, self.status
        )
    }
}
