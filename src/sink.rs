use crate::model::ResolvedMarker;
use std::collections::BTreeSet;

/// Pin colors, one per itinerary day, reused after the eighth day
pub const DAY_PALETTE: [&str; 8] = [
    "#4f8cff", "#2fb36d", "#de3e3e", "#f2a900", "#a55eea", "#20b2aa", "#ff7f50", "#00bcd4",
];

const UNASSIGNED_COLOR: &str = "#ffffff";

/// Pin color for a day; day-less markers are white
pub fn day_color(day: Option<u32>) -> &'static str {
    match day {
        Some(day) if day > 0 => DAY_PALETTE[((day - 1) as usize) % DAY_PALETTE.len()],
        _ => UNASSIGNED_COLOR,
    }
}

/// Distinct day numbers carried by the markers, ascending
pub fn days_present(markers: &[ResolvedMarker]) -> Vec<u32> {
    markers
        .iter()
        .filter_map(|m| m.day)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// A driving route through one day's markers
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub day: u32,
    pub origin: ResolvedMarker,
    pub destination: ResolvedMarker,
    pub waypoints: Vec<ResolvedMarker>,
}

/// Route through the markers of `day` in marker order.
///
/// Needs at least two points; anything less has nothing to draw.
pub fn route_for_day(markers: &[ResolvedMarker], day: u32) -> Option<RouteRequest> {
    let stops: Vec<&ResolvedMarker> = markers.iter().filter(|m| m.day == Some(day)).collect();
    let (origin, rest) = stops.split_first()?;
    let (destination, middle) = rest.split_last()?;
    Some(RouteRequest {
        day,
        origin: (*origin).clone(),
        destination: (*destination).clone(),
        waypoints: middle.iter().map(|m| (*m).clone()).collect(),
    })
}

/// Deep link that opens turn-by-turn navigation to the marker in the vendor app
pub fn navigation_url(marker: &ResolvedMarker) -> String {
    let name = if marker.name.trim().is_empty() {
        "目的地"
    } else {
        marker.name.as_str()
    };
    format!(
        "https://uri.amap.com/navigation?to={},{},{}&mode=car&policy=1",
        marker.lng,
        marker.lat,
        urlencoding::encode(name)
    )
}

/// Anything that can display markers on a map
pub trait MapSink {
    /// Replace the displayed pins with `markers`
    fn render(&mut self, markers: &[ResolvedMarker]);

    fn draw_route(&mut self, route: &RouteRequest);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(name: &str, day: Option<u32>) -> ResolvedMarker {
        ResolvedMarker::new(name, 118.8, 32.0).with_day(day)
    }

    #[derive(Default)]
    struct RecordingSink {
        pins: Vec<String>,
        routes: Vec<u32>,
    }

    impl MapSink for RecordingSink {
        fn render(&mut self, markers: &[ResolvedMarker]) {
            self.pins = markers
                .iter()
                .map(|m| format!("{}:{}", m.name, day_color(m.day)))
                .collect();
        }

        fn draw_route(&mut self, route: &RouteRequest) {
            self.routes.push(route.day);
        }
    }

    #[test]
    fn test_day_color_cycles() {
        assert_eq!(day_color(Some(1)), "#4f8cff");
        assert_eq!(day_color(Some(8)), "#00bcd4");
        assert_eq!(day_color(Some(9)), "#4f8cff");
        assert_eq!(day_color(None), "#ffffff");
        assert_eq!(day_color(Some(0)), "#ffffff");
    }

    #[test]
    fn test_days_present() {
        let markers = vec![
            marker("a", Some(3)),
            marker("b", None),
            marker("c", Some(1)),
            marker("d", Some(3)),
        ];
        assert_eq!(days_present(&markers), vec![1, 3]);
    }

    #[test]
    fn test_route_for_day() {
        let markers = vec![
            marker("中山陵", Some(1)),
            marker("夫子庙", Some(2)),
            marker("明孝陵", Some(1)),
            marker("音乐台", Some(1)),
            marker("玄武湖", Some(1)),
        ];
        let route = route_for_day(&markers, 1).unwrap();
        assert_eq!(route.origin.name, "中山陵");
        assert_eq!(route.destination.name, "玄武湖");
        let waypoints: Vec<&str> = route.waypoints.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(waypoints, vec!["明孝陵", "音乐台"]);
    }

    #[test]
    fn test_route_needs_two_points() {
        let markers = vec![marker("夫子庙", Some(2))];
        assert!(route_for_day(&markers, 2).is_none());
        assert!(route_for_day(&markers, 5).is_none());
    }

    #[test]
    fn test_navigation_url() {
        let url = navigation_url(&ResolvedMarker::new("中山陵", 118.85, 32.06));
        assert_eq!(
            url,
            "https://uri.amap.com/navigation?to=118.85,32.06,%E4%B8%AD%E5%B1%B1%E9%99%B5&mode=car&policy=1"
        );
        let unnamed = navigation_url(&ResolvedMarker::new(" ", 118.85, 32.06));
        assert!(unnamed.contains(&urlencoding::encode("目的地").into_owned()));
    }

    #[test]
    fn test_sink_receives_colored_pins_and_routes() {
        let markers = vec![marker("a", Some(1)), marker("b", Some(1)), marker("c", None)];
        let mut sink = RecordingSink::default();
        sink.render(&markers);
        for day in days_present(&markers) {
            if let Some(route) = route_for_day(&markers, day) {
                sink.draw_route(&route);
            }
        }
        assert_eq!(sink.pins, vec!["a:#4f8cff", "b:#4f8cff", "c:#ffffff"]);
        assert_eq!(sink.routes, vec![1]);
    }
}
