//! Item selection policy
//!
//! Decides, one item at a time, what to add to a meal cart so that the pretax
//! subtotal reaches the subsidy target without ever passing the cap. The
//! policy is a pure function of its inputs: the same catalog, cart, profile and
//! budget always produce the same action.
//!
//! Composition rules:
//! - an empty cart starts with a main, ranked by priority tag, then preferred
//!   cuisine, then price, then catalog order;
//! - once the cart has items, sides and extras come before further mains;
//! - while below the target, only items after which the target is still
//!   reachable are considered, as long as any such item exists.

use super::{BudgetPolicy, DietaryProfile};
use crate::menu::{tags, CartState, Category, MenuItem, Money};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Outcome of one selection step
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionAction {
    AddItem(MenuItem),
    StopSelection,
}

/// How to approach the subsidy target once a main is in the cart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStrategy {
    /// Take the item that lands closest below the target; cross it with the
    /// smallest overshoot once nothing stays below.
    #[default]
    ClosestBelow,
    /// Cross the target as soon as any single item can, cheapest crosser first.
    FewestAdditions,
}

/// Configurable ranking heuristics for [`ItemSelectionPolicy::select_next`]
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSelectionPolicy {
    priority_tags: Vec<String>,
    preferred_cuisines: Vec<String>,
    strategy: FillStrategy,
}

impl Default for ItemSelectionPolicy {
    fn default() -> Self {
        Self {
            priority_tags: vec![tags::PROTEIN.to_string()],
            preferred_cuisines: Vec::new(),
            strategy: FillStrategy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    index: usize,
    item: &'a MenuItem,
}

impl Candidate<'_> {
    fn price(&self) -> Money {
        self.item.pretax_price
    }
}

impl ItemSelectionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags that mark a preferred main, highest priority first
    pub fn with_priority_tags(mut self, tags: Vec<String>) -> Self {
        self.priority_tags = tags.into_iter().map(|t| t.to_lowercase()).collect();
        self
    }

    /// Advisory cuisine preference; ranks mains, never filters them
    pub fn with_preferred_cuisines(mut self, cuisines: Vec<String>) -> Self {
        self.preferred_cuisines = cuisines.into_iter().map(|c| c.to_lowercase()).collect();
        self
    }

    pub fn with_strategy(mut self, strategy: FillStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> FillStrategy {
        self.strategy
    }

    /// Decide the next item to add, or that selection is complete.
    ///
    /// Every returned item satisfies `cart.subtotal() + price <= max_pretax_total`.
    pub fn select_next(
        &self,
        candidates: &[MenuItem],
        cart: &CartState,
        profile: &DietaryProfile,
        budget: &BudgetPolicy,
    ) -> SelectionAction {
        let subtotal = cart.subtotal();
        let mut seen = HashSet::new();
        let pool: Vec<Candidate> = candidates
            .iter()
            .enumerate()
            .filter(|&(_, item)| seen.insert(item.id.as_str()))
            .filter(|&(_, item)| item.pretax_price.is_positive())
            .filter(|&(_, item)| !cart.contains(&item.id) && profile.is_eligible(item))
            .filter(|&(_, item)| budget.fits(subtotal, item.pretax_price))
            .map(|(index, item)| Candidate { index, item })
            .collect();

        if pool.is_empty() {
            return SelectionAction::StopSelection;
        }

        let choice = if budget.target_met(subtotal) {
            self.keep_filling(&pool, cart, budget)
        } else {
            self.approach_target(&pool, cart, budget)
        };

        match choice {
            Some(candidate) => SelectionAction::AddItem(candidate.item.clone()),
            None => SelectionAction::StopSelection,
        }
    }

    /// Run the selection loop against a static catalog, assuming every add
    /// succeeds. Used for previews and dry runs.
    pub fn fill_cart(
        &self,
        candidates: &[MenuItem],
        profile: &DietaryProfile,
        budget: &BudgetPolicy,
    ) -> CartState {
        let mut cart = CartState::new();
        while let SelectionAction::AddItem(item) =
            self.select_next(candidates, &cart, profile, budget)
        {
            cart.add(item);
        }
        cart
    }

    fn approach_target<'a>(
        &self,
        pool: &[Candidate<'a>],
        cart: &CartState,
        budget: &BudgetPolicy,
    ) -> Option<Candidate<'a>> {
        let subtotal = cart.subtotal();
        let groups = composition_groups(pool, cart);

        let first_main = |is_main: bool| is_main && cart.is_empty();

        for (is_main, group) in &groups {
            let feasible: Vec<Candidate> = group
                .iter()
                .copied()
                .filter(|c| target_reachable_after(*c, pool, subtotal, budget))
                .collect();
            if !feasible.is_empty() {
                return Some(self.rank(&feasible, first_main(*is_main), subtotal, budget));
            }
        }

        // Target is out of reach: spend what the composition rules allow.
        groups
            .iter()
            .find(|(_, group)| !group.is_empty())
            .map(|(is_main, group)| self.rank(group, first_main(*is_main), subtotal, budget))
    }

    fn keep_filling<'a>(
        &self,
        pool: &[Candidate<'a>],
        cart: &CartState,
        budget: &BudgetPolicy,
    ) -> Option<Candidate<'a>> {
        let subtotal = cart.subtotal();
        let groups = composition_groups(pool, cart);
        let (_, group) = groups.into_iter().find(|(_, group)| !group.is_empty())?;

        // Cheapest item that still lies on a path to the fullest cart
        let best = best_reachable(subtotal, group.iter().map(Candidate::price), budget);
        let mut ordered = group.clone();
        ordered.sort_by_key(|c| (c.price(), c.index));
        ordered.iter().copied().find(|c| {
            let after = subtotal + c.price();
            let rest = group
                .iter()
                .filter(|other| other.index != c.index)
                .map(Candidate::price);
            after + best_reachable(after, rest, budget) == subtotal + best
        })
    }

    fn rank<'a>(
        &self,
        group: &[Candidate<'a>],
        first_main: bool,
        subtotal: Money,
        budget: &BudgetPolicy,
    ) -> Candidate<'a> {
        if first_main {
            return *group
                .iter()
                .min_by_key(|c| {
                    (
                        self.priority_rank(c.item),
                        self.cuisine_rank(c.item),
                        c.price(),
                        c.index,
                    )
                })
                .unwrap_or(&group[0]);
        }

        let target = budget.min_subsidy_target();
        let (below, crossing): (Vec<Candidate>, Vec<Candidate>) = group
            .iter()
            .partition(|c| subtotal + c.price() < target);

        let closest_below = below
            .iter()
            .max_by_key(|c| (c.price(), std::cmp::Reverse(c.index)))
            .copied();
        let cheapest_crossing = crossing
            .iter()
            .min_by_key(|c| (c.price(), c.index))
            .copied();

        let choice = match self.strategy {
            FillStrategy::ClosestBelow => closest_below.or(cheapest_crossing),
            FillStrategy::FewestAdditions => cheapest_crossing.or(closest_below),
        };
        choice.unwrap_or(group[0])
    }

    fn priority_rank(&self, item: &MenuItem) -> usize {
        self.priority_tags
            .iter()
            .position(|tag| item.has_tag(tag))
            .unwrap_or(self.priority_tags.len())
    }

    fn cuisine_rank(&self, item: &MenuItem) -> usize {
        let preferred = item.cuisine.as_ref().is_some_and(|cuisine| {
            self.preferred_cuisines
                .iter()
                .any(|p| p.eq_ignore_ascii_case(cuisine))
        });
        usize::from(!preferred)
    }
}

/// Split the pool into the category groups allowed next, in preference order.
/// Each entry carries whether the group holds mains.
fn composition_groups<'a>(
    pool: &[Candidate<'a>],
    cart: &CartState,
) -> [(bool, Vec<Candidate<'a>>); 2] {
    let (mains, others): (Vec<Candidate>, Vec<Candidate>) =
        pool.iter().partition(|c| c.item.category == Category::Main);
    if cart.is_empty() {
        [(true, mains), (false, others)]
    } else {
        [(false, others), (true, mains)]
    }
}

/// Subset sums reachable from `start` without passing the cap, as cent
/// offsets from `start`.
fn reachable_offsets(
    start: Money,
    prices: impl Iterator<Item = Money>,
    budget: &BudgetPolicy,
) -> Vec<bool> {
    let room = budget.headroom(start).cents().max(0) as usize;
    let mut reach = vec![false; room + 1];
    reach[0] = true;
    for price in prices {
        let p = price.cents() as usize;
        if p == 0 || p > room {
            continue;
        }
        for offset in (0..=room - p).rev() {
            if reach[offset] {
                reach[offset + p] = true;
            }
        }
    }
    reach
}

fn target_reachable_after(
    candidate: Candidate,
    pool: &[Candidate],
    subtotal: Money,
    budget: &BudgetPolicy,
) -> bool {
    let after = subtotal + candidate.price();
    if budget.target_met(after) {
        return true;
    }
    let rest = pool
        .iter()
        .filter(|c| c.index != candidate.index)
        .map(Candidate::price);
    let needed = (budget.min_subsidy_target() - after).cents() as usize;
    reachable_offsets(after, rest, budget)
        .iter()
        .skip(needed)
        .any(|&reachable| reachable)
}

fn best_reachable(
    start: Money,
    prices: impl Iterator<Item = Money>,
    budget: &BudgetPolicy,
) -> Money {
    let reach = reachable_offsets(start, prices, budget);
    let best = reach.iter().rposition(|&r| r).unwrap_or(0);
    Money::from_cents(best as i64)
}
