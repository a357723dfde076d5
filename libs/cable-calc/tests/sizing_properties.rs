//! Property checks for cable selection
//!
//! Sweeps loads, lengths and supply conditions over the standard table.

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use cable_calc::{
    design_current, max_voltage_drop, select_cable, standard_table, voltage_drop,
    InstallationMethod, Phase,
};

const LOADS: [f64; 9] = [1.0, 5.0, 10.0, 16.0, 20.0, 32.0, 45.0, 63.0, 80.0];
const LENGTHS: [f64; 8] = [0.0, 5.0, 12.5, 25.0, 50.0, 100.0, 200.0, 400.0];
const VOLTAGES: [(f64, Phase); 3] = [(230.0, Phase::Single), (400.0, Phase::Three), (110.0, Phase::Single)];

fn table_index(size: &str) -> usize {
    standard_table()
        .iter()
        .position(|spec| spec.size == size)
        .unwrap()
}

#[test]
fn selected_cable_carries_design_current_and_meets_drop_limit() {
    for method in InstallationMethod::ALL {
        for (voltage, phase) in VOLTAGES {
            for load in LOADS {
                for length in LENGTHS {
                    let Some(result) = select_cable(load, voltage, length, method, phase) else {
                        continue;
                    };
                    let spec = &standard_table()[table_index(&result.selected_cable_size)];

                    assert!(spec.rating(method) >= load * 1.15);
                    assert!(result.voltage_drop_volts <= max_voltage_drop(voltage, phase));
                    assert!(result.is_feasible);
                    assert_eq!(result.required_design_current_amps, design_current(load));
                }
            }
        }
    }
}

#[test]
fn result_is_first_passing_entry() {
    for method in InstallationMethod::ALL {
        for (voltage, phase) in VOLTAGES {
            for load in LOADS {
                for length in LENGTHS {
                    let expected = standard_table().iter().find(|spec| {
                        spec.rating(method) >= design_current(load)
                            && voltage_drop(spec, load, length, phase)
                                <= max_voltage_drop(voltage, phase)
                    });
                    let actual = select_cable(load, voltage, length, method, phase);

                    assert_eq!(
                        expected.map(|spec| spec.size),
                        actual.as_ref().map(|r| r.selected_cable_size.as_str()),
                        "load={load} length={length} method={method} phase={phase}"
                    );
                }
            }
        }
    }
}

#[test]
fn longer_runs_never_select_a_smaller_cable() {
    for method in InstallationMethod::ALL {
        for (voltage, phase) in VOLTAGES {
            for load in LOADS {
                let mut previous: Option<usize> = None;
                let mut exhausted = false;

                for length in LENGTHS {
                    match select_cable(load, voltage, length, method, phase) {
                        Some(result) => {
                            assert!(!exhausted, "feasible again after exhausting the table");
                            let index = table_index(&result.selected_cable_size);
                            if let Some(prev) = previous {
                                assert!(index >= prev);
                            }
                            previous = Some(index);
                        },
                        None => exhausted = true,
                    }
                }
            }
        }
    }
}

#[test]
fn three_phase_drop_is_root_three_over_two_of_single_phase() {
    for spec in standard_table() {
        for load in LOADS {
            for length in LENGTHS.iter().copied().filter(|l| *l > 0.0) {
                let single = voltage_drop(spec, load, length, Phase::Single);
                let three = voltage_drop(spec, load, length, Phase::Three);
                assert!((three / single - 0.866_025_403_784_438_6).abs() < 1e-12);
            }
        }
    }
}

#[test]
fn capacity_pass_with_drop_failure_continues_scanning() {
    let result = select_cable(20.0, 230.0, 25.0, InstallationMethod::Air, Phase::Single).unwrap();
    assert_eq!(result.selected_cable_size, "4mm²");
    assert!((result.voltage_drop_volts - 5.52).abs() < 1e-9);
    assert!((result.voltage_drop_percent - 2.4).abs() < 1e-9);
}

#[test]
fn load_beyond_largest_rating_is_infeasible() {
    assert!(select_cable(100.0, 230.0, 1.0, InstallationMethod::Ground, Phase::Single).is_none());
    assert!(select_cable(100.0, 400.0, 0.0, InstallationMethod::Air, Phase::Three).is_none());
}
