use crate::domain::error::DomainError;
use crate::domain::model::CustomerId;
use chrono::{Datelike, Utc};

/// 郵便番号の最小長
const MIN_POST_CODE_LENGTH: usize = 6;
/// 郵便番号の最大長
const MAX_POST_CODE_LENGTH: usize = 8;

/// 配送先住所
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    first_line: String,
    second_line: Option<String>,
    city: String,
    county: String,
    post_code: String,
}

impl Address {
    /// 新しい住所を作成
    /// 各項目は前後の空白を除去して保持し、郵便番号は大文字に正規化する
    pub fn new(
        first_line: String,
        second_line: Option<String>,
        city: String,
        county: String,
        post_code: String,
    ) -> Result<Self, DomainError> {
        let first_line = Self::required_field(first_line, "住所1行目")?;
        let city = Self::required_field(city, "市区町村")?;
        let county = Self::required_field(county, "州・県")?;
        let post_code = Self::validate_post_code(post_code)?;
        let second_line = second_line
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty());
        Ok(Self {
            first_line,
            second_line,
            city,
            county,
            post_code,
        })
    }

    fn required_field(value: String, label: &str) -> Result<String, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::AddressValidation(format!(
                "{}は必須です",
                label
            )));
        }
        Ok(trimmed.to_string())
    }

    fn validate_post_code(post_code: String) -> Result<String, DomainError> {
        let normalized = post_code.trim().to_uppercase();
        let length = normalized.chars().count();
        if !(MIN_POST_CODE_LENGTH..=MAX_POST_CODE_LENGTH).contains(&length) {
            return Err(DomainError::AddressValidation(format!(
                "郵便番号は{}文字から{}文字で指定してください: {}",
                MIN_POST_CODE_LENGTH, MAX_POST_CODE_LENGTH, post_code
            )));
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ')
        {
            return Err(DomainError::AddressValidation(format!(
                "郵便番号に使用できない文字が含まれています: {}",
                post_code
            )));
        }
        Ok(normalized)
    }

    pub fn first_line(&self) -> &str {
        &self.first_line
    }

    pub fn second_line(&self) -> Option<&str> {
        self.second_line.as_deref()
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn county(&self) -> &str {
        &self.county
    }

    pub fn post_code(&self) -> &str {
        &self.post_code
    }
}

/// 支払いカード情報
/// 番号とCVVは平文で保持するが、参照用にはマスク済みの値を公開する
#[derive(Debug, Clone, PartialEq)]
pub struct CardDetails {
    card_number: String,
    expiry_month: u32,
    expiry_year: u32,
    cvv: String,
}

impl CardDetails {
    /// 新しいカード情報を作成
    ///
    /// # Arguments
    /// * `card_number` - カード番号（16桁の数字）
    /// * `expiry` - 有効期限（MM/YY形式、過去の年月は不可）
    /// * `cvv` - セキュリティコード（3桁または4桁の数字）
    pub fn new(card_number: String, expiry: &str, cvv: String) -> Result<Self, DomainError> {
        let card_number = card_number.trim().to_string();
        if card_number.len() != 16 || !card_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::CardValidation(
                "カード番号は16桁の数字で指定してください".to_string(),
            ));
        }

        let (expiry_month, expiry_year) = Self::parse_expiry(expiry)?;

        if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::CardValidation(
                "CVVは3桁または4桁の数字で指定してください".to_string(),
            ));
        }

        Ok(Self {
            card_number,
            expiry_month,
            expiry_year,
            cvv,
        })
    }

    fn parse_expiry(expiry: &str) -> Result<(u32, u32), DomainError> {
        let invalid = || {
            DomainError::CardValidation(format!(
                "有効期限はMM/YY形式で指定してください: {}",
                expiry
            ))
        };
        let (month_str, year_str) = expiry.split_once('/').ok_or_else(invalid)?;
        if month_str.len() != 2 || year_str.len() != 2 {
            return Err(invalid());
        }
        let month: u32 = month_str.parse().map_err(|_| invalid())?;
        let year_suffix: u32 = year_str.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }

        let year = 2000 + year_suffix;
        let now = Utc::now();
        if year < now.year() as u32 || (year == now.year() as u32 && month < now.month()) {
            return Err(DomainError::CardValidation(format!(
                "カードの有効期限が切れています: {}",
                expiry
            )));
        }
        Ok((month, year))
    }

    /// 下4桁以外を伏せたカード番号
    pub fn masked_card_number(&self) -> String {
        format!("**** **** **** {}", &self.card_number[12..])
    }

    /// 有効期限（MM/YY形式）
    pub fn expiry(&self) -> String {
        format!("{:02}/{:02}", self.expiry_month, self.expiry_year % 100)
    }

    /// 伏せたCVV
    pub fn masked_cvv(&self) -> String {
        "*".repeat(self.cvv.len())
    }
}

/// 顧客集約
/// 住所とカード情報は任意で、両方揃って初めて注文を確定できる
#[derive(Debug, Clone)]
pub struct Customer {
    id: CustomerId,
    first_name: String,
    last_name: String,
    email: String,
    address: Option<Address>,
    card_details: Option<CardDetails>,
}

impl Customer {
    /// 新しい顧客を作成
    pub fn new(
        id: CustomerId,
        first_name: String,
        last_name: String,
        email: String,
    ) -> Result<Self, DomainError> {
        if first_name.trim().is_empty() {
            return Err(DomainError::CustomerValidation(
                "名は必須です".to_string(),
            ));
        }
        if last_name.trim().is_empty() {
            return Err(DomainError::CustomerValidation(
                "姓は必須です".to_string(),
            ));
        }
        Self::validate_email(&email)?;
        Ok(Self {
            id,
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email: email.trim().to_string(),
            address: None,
            card_details: None,
        })
    }

    /// 永続化済みの状態から顧客を復元
    pub fn reconstruct(
        id: CustomerId,
        first_name: String,
        last_name: String,
        email: String,
        address: Option<Address>,
        card_details: Option<CardDetails>,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            email,
            address,
            card_details,
        }
    }

    // ローカル部とドメイン部が空でなく、ドメインにドットがあること
    fn validate_email(email: &str) -> Result<(), DomainError> {
        let trimmed = email.trim();
        let valid = trimmed
            .split_once('@')
            .map(|(local, domain)| {
                !local.is_empty()
                    && !domain.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !trimmed.contains(char::is_whitespace)
            })
            .unwrap_or(false);
        if !valid {
            return Err(DomainError::CustomerValidation(format!(
                "メールアドレスの形式が不正です: {}",
                email
            )));
        }
        Ok(())
    }

    /// 配送先住所を登録する
    pub fn set_address(&mut self, address: Address) {
        self.address = Some(address);
    }

    /// カード情報を登録する
    pub fn set_card_details(&mut self, card_details: CardDetails) {
        self.card_details = Some(card_details);
    }

    /// 注文の確定に必要な情報（住所とカード）が揃っているか
    pub fn has_complete_details(&self) -> bool {
        self.address.is_some() && self.card_details.is_some()
    }

    pub fn id(&self) -> CustomerId {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn card_details(&self) -> Option<&CardDetails> {
        self.card_details.as_ref()
    }
}
