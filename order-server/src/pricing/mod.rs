//! Pricing module - pure order money computation

pub mod calculator;

pub use calculator::{
    addon_amount, countable_quantity, discount_amount, item_line_total, items_subtotal,
    percentage_of, product_subset_subtotal, recalculate_totals, recomputed_total,
    surcharge_amount,
};
