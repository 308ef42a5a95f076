// config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    // Payment gateway configuration
    pub razorpay_key_id: String,
    pub razorpay_key_secret: String,
    pub payment_currency: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");

        // Gateway credentials (with test defaults)
        let razorpay_key_id = std::env::var("RAZORPAY_KEY_ID")
            .unwrap_or_else(|_| "rzp_test_key".to_string());
        let razorpay_key_secret = std::env::var("RAZORPAY_KEY_SECRET")
            .unwrap_or_else(|_| "test_secret_key".to_string());
        let payment_currency = std::env::var("PAYMENT_CURRENCY")
            .unwrap_or_else(|_| "INR".to_string());

        Config {
            database_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().unwrap(),
            port: 8000,
            razorpay_key_id,
            razorpay_key_secret,
            payment_currency,
        }
    }
}
