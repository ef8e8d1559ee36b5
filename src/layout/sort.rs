use super::squarify::LayoutItem;

/// Sort `items` by size, largest first. Not stable.
///
/// Returns false when there was nothing to sort (fewer than two items).
pub fn sort_descending<T: LayoutItem>(items: &mut [T]) -> bool {
    if items.len() < 2 {
        return false;
    }
    quick_sort_desc(items, 0, items.len() - 1)
}

/// In-place descending quicksort of `items[lower..=higher]`, pivot on the
/// middle element.
///
/// Empty ranges, single elements and out-of-range indices leave `items`
/// untouched and return false.
pub fn quick_sort_desc<T: LayoutItem>(items: &mut [T], lower: usize, higher: usize) -> bool {
    if lower >= higher || higher >= items.len() {
        return false;
    }
    partition_sort(items, lower as isize, higher as isize);
    true
}

fn partition_sort<T: LayoutItem>(items: &mut [T], lower: isize, higher: isize) {
    let mut i = lower;
    let mut j = higher;
    let pivot = items[(lower + (higher - lower) / 2) as usize].size();

    while i <= j {
        // Left scan stops on anything not larger than the pivot, right scan
        // on anything not smaller, then the two are exchanged.
        while items[i as usize].size() > pivot {
            i += 1;
        }
        while items[j as usize].size() < pivot {
            j -= 1;
        }
        if i <= j {
            items.swap(i as usize, j as usize);
            i += 1;
            j -= 1;
        }
    }

    if lower < j {
        partition_sort(items, lower, j);
    }
    if i < higher {
        partition_sort(items, i, higher);
    }
}
