#[derive(Debug, confique::Config)]
pub struct SaleConfig {
    /// Value of the `product` field of every created sale.
    #[config(default = "teste")]
    pub product: String,

    /// Value of the `amount` field of every created sale.
    #[config(default = 223.34, validate(amount.is_finite(), "must be a finite number"))]
    pub amount: f64,

    /// If `true`, every created sale is fetched again via `GET /sales/<id>`,
    /// using the `id` from the create response. Responses that do not contain
    /// a sale are not followed up.
    #[config(default = false)]
    pub read_back: bool,
}
