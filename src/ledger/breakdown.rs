use uuid::Uuid;

use super::folders::{Folder, ScopedInvoice};

/// Chart colours, assigned to projects by position.
pub const PALETTE: [[u8; 3]; 9] = [
    [0x25, 0x63, 0xeb],
    [0x16, 0xa3, 0x4a],
    [0xf9, 0x73, 0x16],
    [0xdc, 0x26, 0x26],
    [0x7c, 0x3a, 0xed],
    [0x08, 0x91, 0xb2],
    [0xea, 0xb3, 0x08],
    [0xdb, 0x27, 0x77],
    [0x0f, 0x17, 0x2a],
];

/// Neutral colour of an empty chart.
pub const EMPTY_COLOR: [u8; 3] = [0xe5, 0xe7, 0xeb];

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectTotal {
    pub id: Uuid,
    pub name: String,
    pub paid: f64,
    pub unpaid: f64,
    pub total: f64,
    pub payroll_total: f64,
    pub color: [u8; 3],
}

/// Per-project totals for the dashboard.
///
/// Only projects passing the project filter that own at least one of the
/// filtered invoices are listed.
pub fn project_totals(
    folders: &[Folder],
    filtered: &[ScopedInvoice],
    project_filter: Option<Uuid>,
) -> Vec<ProjectTotal> {
    if filtered.is_empty() {
        return Vec::new();
    }

    folders
        .iter()
        .filter(|folder| project_filter.map_or(true, |id| folder.id == id))
        .filter(|folder| filtered.iter().any(|s| s.folder_id == folder.id))
        .enumerate()
        .map(|(index, folder)| {
            let (paid, unpaid) = filtered
                .iter()
                .filter(|s| s.folder_id == folder.id)
                .fold((0.0, 0.0), |(paid, unpaid), s| {
                    if s.invoice.paid {
                        (paid + s.invoice.amount, unpaid)
                    } else {
                        (paid, unpaid + s.invoice.amount)
                    }
                });

            ProjectTotal {
                id: folder.id,
                name: folder.name.clone(),
                paid,
                unpaid,
                total: paid + unpaid,
                payroll_total: folder.payroll_total(),
                color: PALETTE[index % PALETTE.len()],
            }
        })
        .collect()
}

/// One slice of a pie chart, in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub project_id: Uuid,
    pub name: String,
    pub color: [u8; 3],
    pub value: f64,
    pub start: f64,
    pub end: f64,
}

impl Arc {
    pub fn degrees(&self) -> f64 {
        self.end - self.start
    }

    pub fn percent(&self) -> f64 {
        self.degrees() / 360.0 * 100.0
    }
}

/// Contiguous arcs covering 360 degrees, or none when the total is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    pub total: f64,
    pub arcs: Vec<Arc>,
}

impl Breakdown {
    pub fn invoices(totals: &[ProjectTotal]) -> Self {
        Self::build(totals, |t| t.total)
    }

    pub fn payroll(totals: &[ProjectTotal]) -> Self {
        Self::build(totals, |t| t.payroll_total)
    }

    fn build(totals: &[ProjectTotal], value: impl Fn(&ProjectTotal) -> f64) -> Self {
        let total: f64 = totals.iter().map(&value).sum();
        if total == 0.0 {
            return Self { total, arcs: Vec::new() };
        }

        let mut current = 0.0;
        let arcs = totals
            .iter()
            .filter(|t| value(*t) > 0.0)
            .map(|t| {
                let start = current;
                current += value(t) / total * 360.0;
                Arc {
                    project_id: t.id,
                    name: t.name.clone(),
                    color: t.color,
                    value: value(t),
                    start,
                    end: current,
                }
            })
            .collect();

        Self { total, arcs }
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayrollBar {
    pub project_id: Uuid,
    pub name: String,
    pub total: f64,
    /// Bar length in percent of the largest payroll total.
    pub width: u16,
}

/// Payroll totals for every folder, scaled against the largest one (never
/// against less than 1).
pub fn payroll_bars(folders: &[Folder]) -> Vec<PayrollBar> {
    let max = folders
        .iter()
        .map(Folder::payroll_total)
        .fold(1.0_f64, f64::max);

    folders
        .iter()
        .map(|folder| {
            let total = folder.payroll_total();
            PayrollBar {
                project_id: folder.id,
                name: folder.name.clone(),
                total,
                width: (total / max * 100.0).round() as u16,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::folders::fixtures::view;
    use crate::models::PayrollEntry;
    use chrono::Utc;

    fn folder(name: &str, payroll: &[f64]) -> Folder {
        let id = Uuid::new_v4();
        Folder {
            id,
            name: name.to_string(),
            owner_email: "admin".to_string(),
            is_active: true,
            invoices: Vec::new(),
            payroll: payroll
                .iter()
                .map(|amount| PayrollEntry {
                    id: Uuid::new_v4(),
                    project_id: id,
                    amount: *amount,
                    created_by: None,
                    created_at: Utc::now(),
                })
                .collect(),
        }
    }

    fn scoped(folder: &Folder, amount: f64, paid: bool) -> ScopedInvoice {
        ScopedInvoice {
            folder_id: folder.id,
            folder_name: folder.name.clone(),
            owner_email: folder.owner_email.clone(),
            invoice: view(amount, paid),
        }
    }

    #[test]
    fn totals_skip_projects_without_filtered_invoices() {
        let a = folder("A", &[50.0]);
        let b = folder("B", &[]);
        let c = folder("C", &[10.0]);
        let filtered = vec![scoped(&a, 100.0, true), scoped(&a, 20.0, false), scoped(&c, 30.0, false)];

        let totals = project_totals(&[a.clone(), b, c.clone()], &filtered, None);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].id, a.id);
        assert_eq!((totals[0].paid, totals[0].unpaid, totals[0].total), (100.0, 20.0, 120.0));
        assert_eq!(totals[0].payroll_total, 50.0);
        assert_eq!(totals[0].color, PALETTE[0]);
        assert_eq!(totals[1].id, c.id);
        assert_eq!(totals[1].color, PALETTE[1]);

        let only_c = project_totals(&[a, c.clone()], &filtered, Some(c.id));
        assert_eq!(only_c.len(), 1);
        assert_eq!(only_c[0].id, c.id);
    }

    #[test]
    fn no_filtered_invoices_means_no_totals() {
        let a = folder("A", &[50.0]);
        assert!(project_totals(&[a], &[], None).is_empty());
    }

    #[test]
    fn arcs_are_proportional_and_cover_the_circle() {
        let a = folder("A", &[30.0]);
        let b = folder("B", &[]);
        let c = folder("C", &[10.0]);
        let filtered = vec![scoped(&a, 75.0, false), scoped(&b, 0.0, false), scoped(&c, 25.0, true)];
        let totals = project_totals(&[a, b, c], &filtered, None);

        let pie = Breakdown::invoices(&totals);
        assert_eq!(pie.total, 100.0);
        assert_eq!(pie.arcs.len(), 2);
        assert_eq!((pie.arcs[0].start, pie.arcs[0].end), (0.0, 270.0));
        assert_eq!((pie.arcs[1].start, pie.arcs[1].end), (270.0, 360.0));
        assert_eq!(pie.arcs[1].percent(), 25.0);

        let payroll = Breakdown::payroll(&totals);
        assert_eq!(payroll.total, 40.0);
        assert_eq!(payroll.arcs.len(), 2);
        assert_eq!(payroll.arcs[0].degrees(), 270.0);
    }

    #[test]
    fn zero_total_is_degenerate() {
        let a = folder("A", &[]);
        let filtered = vec![scoped(&a, 0.0, false)];
        let totals = project_totals(&[a], &filtered, None);

        let pie = Breakdown::invoices(&totals);
        assert!(pie.is_empty());
        assert_eq!(pie.total, 0.0);
    }

    #[test]
    fn payroll_bars_scale_to_the_largest_total() {
        let bars = payroll_bars(&[folder("A", &[200.0]), folder("B", &[50.0, 25.0]), folder("C", &[])]);
        let widths: Vec<u16> = bars.iter().map(|b| b.width).collect();
        assert_eq!(widths, vec![100, 38, 0]);

        let small = payroll_bars(&[folder("A", &[0.5])]);
        assert_eq!(small[0].width, 50);
    }
}
