//! Product routing
//!
//! A data-driven table maps assembled products to the handlers that want
//! them. Every matching route runs - dispatch is not first-match-wins, so a
//! product carrying several handlers' interests reaches all of them.

use crate::app::models::TextProduct;
use crate::constants::{MCD_PRODUCT_CODE, is_vtec_product};

/// What a matched route hands the product to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    /// The VTEC event reconciler
    VtecReconcile,
    /// The Mesoscale Discussion decoder
    McdDecode,
}

/// A product route: a predicate over the assembled product and a target
#[derive(Debug)]
pub struct Route {
    pub name: &'static str,
    pub target: RouteTarget,
    matches: fn(&TextProduct) -> bool,
}

impl Route {
    /// Whether this route wants the product
    pub fn matches(&self, product: &TextProduct) -> bool {
        (self.matches)(product)
    }
}

/// The route table
pub const ROUTES: &[Route] = &[
    Route {
        name: "VTEC Handler",
        target: RouteTarget::VtecReconcile,
        matches: |product| is_vtec_product(&product.product_code),
    },
    Route {
        name: "MCD Handler",
        target: RouteTarget::McdDecode,
        matches: |product| product.awips.raw == MCD_PRODUCT_CODE,
    },
];

/// Every route that wants the product, in table order
pub fn matching_routes(product: &TextProduct) -> Vec<&'static Route> {
    ROUTES.iter().filter(|route| route.matches(product)).collect()
}
