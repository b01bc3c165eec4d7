use std::fmt;

#[derive(Debug, Clone)]
pub enum NitondbError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    DateParse(String),
    CsvParse(String),
    DictionaryError(String),
    NoMatchingStandards(String),
    CalibrationInvalid(String),
}

impl NitondbError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            NitondbError::DatabaseConfig(_) => "E001",
            NitondbError::DatabaseConnection(_) => "E002",
            NitondbError::DatabaseOperation(_) => "E003",
            NitondbError::FileOperation(_) => "E004",
            NitondbError::Validation(_) => "E005",
            NitondbError::NotFound(_) => "E006",
            NitondbError::Serialization(_) => "E007",
            NitondbError::DateParse(_) => "E008",
            NitondbError::CsvParse(_) => "E009",
            NitondbError::DictionaryError(_) => "E010",
            NitondbError::NoMatchingStandards(_) => "E011",
            NitondbError::CalibrationInvalid(_) => "E012",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            NitondbError::DatabaseConfig(_) => "Database Configuration Error",
            NitondbError::DatabaseConnection(_) => "Database Connection Error",
            NitondbError::DatabaseOperation(_) => "Database Operation Error",
            NitondbError::FileOperation(_) => "File Operation Error",
            NitondbError::Validation(_) => "Validation Error",
            NitondbError::NotFound(_) => "Resource Not Found",
            NitondbError::Serialization(_) => "Serialization Error",
            NitondbError::DateParse(_) => "Date Parse Error",
            NitondbError::CsvParse(_) => "CSV Parse Error",
            NitondbError::DictionaryError(_) => "Measurement Dictionary Error",
            NitondbError::NoMatchingStandards(_) => "No Matching Standards",
            NitondbError::CalibrationInvalid(_) => "Invalid Calibration Document",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            NitondbError::DatabaseConfig(msg) => msg,
            NitondbError::DatabaseConnection(msg) => msg,
            NitondbError::DatabaseOperation(msg) => msg,
            NitondbError::FileOperation(msg) => msg,
            NitondbError::Validation(msg) => msg,
            NitondbError::NotFound(msg) => msg,
            NitondbError::Serialization(msg) => msg,
            NitondbError::DateParse(msg) => msg,
            NitondbError::CsvParse(msg) => msg,
            NitondbError::DictionaryError(msg) => msg,
            NitondbError::NoMatchingStandards(msg) => msg,
            NitondbError::CalibrationInvalid(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于 CLI 错误出口）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for NitondbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for NitondbError {}

// 便捷的构造函数
impl NitondbError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        NitondbError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        NitondbError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        NitondbError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        NitondbError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        NitondbError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        NitondbError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        NitondbError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        NitondbError::DateParse(msg.into())
    }

    pub fn csv_parse<T: Into<String>>(msg: T) -> Self {
        NitondbError::CsvParse(msg.into())
    }

    pub fn dictionary_error<T: Into<String>>(msg: T) -> Self {
        NitondbError::DictionaryError(msg.into())
    }

    pub fn no_matching_standards<T: Into<String>>(msg: T) -> Self {
        NitondbError::NoMatchingStandards(msg.into())
    }

    pub fn calibration_invalid<T: Into<String>>(msg: T) -> Self {
        NitondbError::CalibrationInvalid(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for NitondbError {
    fn from(err: sea_orm::DbErr) -> Self {
        NitondbError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for NitondbError {
    fn from(err: std::io::Error) -> Self {
        NitondbError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for NitondbError {
    fn from(err: serde_json::Error) -> Self {
        NitondbError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for NitondbError {
    fn from(err: csv::Error) -> Self {
        NitondbError::CsvParse(err.to_string())
    }
}

impl From<chrono::ParseError> for NitondbError {
    fn from(err: chrono::ParseError) -> Self {
        NitondbError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NitondbError>;
