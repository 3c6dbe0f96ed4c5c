use super::album::Album;

/// Consecutive albums released in the same year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearSection<'a> {
    pub year: i32,
    pub albums: &'a [Album],
}

/// Split a year-sorted album list into one section per year.
///
/// Each year heads its own section once, in the order the albums are given;
/// a timeline shows the year label only where it changes.
pub fn year_sections(albums: &[Album]) -> Vec<YearSection<'_>> {
    albums
        .chunk_by(|a, b| a.release_year() == b.release_year())
        .filter_map(|albums| {
            let year = albums.first()?.release_year();
            Some(YearSection { year, albums })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::models::album::sort_by_release_year;
    use crate::models::album::tests::album;

    fn year(y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, 6, 1).unwrap()
    }

    #[test]
    fn sections_group_runs_of_one_year() {
        let albums = vec![
            album("a", year(1973)),
            album("b", year(1974)),
            album("c", year(1974)),
            album("d", year(1975)),
        ];

        let sections = year_sections(&albums);
        let summary: Vec<_> = sections
            .iter()
            .map(|section| (section.year, section.albums.len()))
            .collect();
        assert_eq!(summary, vec![(1973, 1), (1974, 2), (1975, 1)]);
    }

    #[test]
    fn no_albums_no_sections() {
        assert!(year_sections(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn sections_partition_sorted_albums(years in proptest::collection::vec(1960i32..1990, 0..30)) {
            let mut albums: Vec<_> = years
                .iter()
                .enumerate()
                .map(|(i, y)| album(&i.to_string(), year(*y)))
                .collect();
            sort_by_release_year(&mut albums);

            let sections = year_sections(&albums);

            let flattened: Vec<_> = sections.iter().flat_map(|section| section.albums.iter()).collect();
            prop_assert_eq!(flattened, albums.iter().collect::<Vec<_>>());
            for section in &sections {
                prop_assert!(section.albums.iter().all(|album| album.release_year() == section.year));
            }
            for pair in sections.windows(2) {
                prop_assert!(pair[0].year < pair[1].year);
            }
        }
    }
}
