use std::f64::consts::PI;

/// Radius of the celestial sphere in scene units.
pub const SKY_RADIUS: f64 = 100.0;

/// Moons are re-projected slightly inside the sky sphere so they draw in
/// front of their parent planet's marker.
pub const MOON_SPHERE_FACTOR: f64 = 0.998;

/// Satellites live on a smaller sphere so they render in front of the stars.
pub const SATELLITE_RADIUS: f64 = 90.0;

/// Arcseconds per radian.
pub const ARCSEC_PER_RAD: f64 = 206_264.806;

/// An observer's position on the Earth's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoLocation {
    /// Latitude in degrees, positive north, clamped to [-90, +90]
    pub latitude_deg: f64,
    /// Longitude in degrees, positive east, wrapped to [-180, +180]
    pub longitude_deg: f64,
}

impl GeoLocation {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        let mut lon = longitude_deg % 360.0;
        if lon > 180.0 {
            lon -= 360.0;
        } else if lon < -180.0 {
            lon += 360.0;
        }
        Self {
            latitude_deg: latitude_deg.clamp(-90.0, 90.0),
            longitude_deg: lon,
        }
    }
}

/// Equatorial coordinates: right ascension in hours [0, 24), declination in
/// degrees [-90, +90]. The star catalog is J2000; planetary positions are
/// mean-of-date to within the engine's accuracy goals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equatorial {
    pub ra_hours: f64,
    pub dec_deg: f64,
}

/// Horizontal coordinates: altitude in degrees [-90, +90], azimuth in
/// degrees [0, 360) measured from true north through east.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizontal {
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
}

/// A point in the observer-attached scene frame: y is up (zenith), x east,
/// z toward the observer (south when azimuth = 180°).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScenePosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ScenePosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Canonical position for objects whose computation failed: nadir on
    /// the sky sphere, never drawn.
    pub fn sentinel() -> Self {
        Self::new(0.0, -SKY_RADIUS, 0.0)
    }

    /// True iff every component is a normal, comparable number. This is the
    /// invariant downstream renderers rely on.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Rescale onto a sphere of the given radius. Zero vectors are left
    /// unchanged rather than dividing by zero.
    pub fn rescaled(&self, radius: f64) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.x / len * radius, self.y / len * radius, self.z / len * radius)
        } else {
            *self
        }
    }
}

/// A unit direction in the J2000 equatorial frame:
/// - X axis points toward RA=0, Dec=0 (vernal equinox)
/// - Y axis points toward RA=6h, Dec=0
/// - Z axis points toward Dec=+90 (north celestial pole)
#[derive(Debug, Clone, Copy, Default)]
pub struct Direction3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Direction3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_equatorial(eq: Equatorial) -> Self {
        let ra_rad = eq.ra_hours * PI / 12.0;
        let dec_rad = eq.dec_deg * PI / 180.0;
        let cos_dec = dec_rad.cos();
        Self {
            x: cos_dec * ra_rad.cos(),
            y: cos_dec * ra_rad.sin(),
            z: dec_rad.sin(),
        }
    }

    /// Normalize to unit length.
    pub fn normalize(&self) -> Self {
        let len = (self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
            }
        } else {
            *self
        }
    }

    pub fn dot(&self, other: &Direction3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Vector cross product; for orthonormal unit inputs this completes a
    /// right-handed basis.
    pub fn cross(&self, other: &Direction3) -> Direction3 {
        Direction3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Convert back to (RA hours, Dec degrees).
    pub fn to_equatorial(&self) -> Equatorial {
        let r = (self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        if r == 0.0 {
            return Equatorial { ra_hours: 0.0, dec_deg: 0.0 };
        }
        let dec = (self.z / r).asin();
        let mut ra = self.y.atan2(self.x);
        if ra < 0.0 {
            ra += 2.0 * PI;
        }
        Equatorial {
            ra_hours: ra * 12.0 / PI,
            dec_deg: dec * 180.0 / PI,
        }
    }
}

/// Normalize an angle to [0, 360) degrees.
pub fn normalize_degrees(deg: f64) -> f64 {
    let d = deg % 360.0;
    if d < 0.0 { d + 360.0 } else { d }
}

/// Normalize to (-180, +180] degrees. -180 ties break to +180.
pub fn normalize_degrees_signed(deg: f64) -> f64 {
    let mut d = deg % 360.0;
    if d <= -180.0 {
        d += 360.0;
    } else if d > 180.0 {
        d -= 360.0;
    }
    d
}

/// Normalize an hour value to [0, 24).
pub fn normalize_hours(hours: f64) -> f64 {
    let h = hours % 24.0;
    if h < 0.0 { h + 24.0 } else { h }
}

/// Convert equatorial (RA, Dec) to horizontal (alt, az) for an observer.
///
/// The azimuth uses the atan2 form, which stays finite at the poles where
/// cos(lat) = 0.
pub fn equatorial_to_horizontal(eq: Equatorial, latitude_deg: f64, lst_hours: f64) -> Horizontal {
    let hour_angle_deg = normalize_degrees_signed((lst_hours - eq.ra_hours) * 15.0);
    let h = hour_angle_deg * PI / 180.0;
    let dec = eq.dec_deg * PI / 180.0;
    let lat = latitude_deg * PI / 180.0;

    let sin_alt = dec.sin() * lat.sin() + dec.cos() * lat.cos() * h.cos();
    let alt = sin_alt.clamp(-1.0, 1.0).asin();

    let az = (-dec.cos() * h.sin()).atan2(dec.sin() * lat.cos() - dec.cos() * lat.sin() * h.cos());

    Horizontal {
        altitude_deg: alt * 180.0 / PI,
        azimuth_deg: normalize_degrees(az * 180.0 / PI),
    }
}

/// Invert `equatorial_to_horizontal` for the same observer and LST.
pub fn horizontal_to_equatorial(hz: Horizontal, latitude_deg: f64, lst_hours: f64) -> Equatorial {
    let alt = hz.altitude_deg * PI / 180.0;
    let az = hz.azimuth_deg * PI / 180.0;
    let lat = latitude_deg * PI / 180.0;

    let sin_dec = alt.sin() * lat.sin() + alt.cos() * lat.cos() * az.cos();
    let dec = sin_dec.clamp(-1.0, 1.0).asin();

    let h = (-az.sin() * alt.cos()).atan2(alt.sin() * lat.cos() - alt.cos() * lat.sin() * az.cos());

    Equatorial {
        ra_hours: normalize_hours(lst_hours - h * 180.0 / PI / 15.0),
        dec_deg: dec * 180.0 / PI,
    }
}

/// Project horizontal coordinates onto a sphere of the given radius in the
/// observer-attached scene frame.
pub fn horizontal_to_cartesian(hz: Horizontal, radius: f64) -> ScenePosition {
    let alt = hz.altitude_deg * PI / 180.0;
    let az = hz.azimuth_deg * PI / 180.0;
    ScenePosition {
        x: radius * alt.cos() * az.sin(),
        y: radius * alt.sin(),
        z: -radius * alt.cos() * az.cos(),
    }
}

/// Recover (alt, az) from a scene-frame position.
pub fn cartesian_to_horizontal(pos: ScenePosition) -> Horizontal {
    let r = pos.length();
    if r == 0.0 {
        return Horizontal { altitude_deg: 0.0, azimuth_deg: 0.0 };
    }
    let alt = (pos.y / r).clamp(-1.0, 1.0).asin();
    let az = pos.x.atan2(-pos.z);
    Horizontal {
        altitude_deg: alt * 180.0 / PI,
        azimuth_deg: normalize_degrees(az * 180.0 / PI),
    }
}

/// Convert ecliptic (lon, lat) to an equatorial direction for the given
/// obliquity of the ecliptic.
pub fn ecliptic_to_equatorial(lon_rad: f64, lat_rad: f64, obliquity_rad: f64) -> Direction3 {
    let cos_lat = lat_rad.cos();
    let sin_lat = lat_rad.sin();
    let cos_lon = lon_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_eps = obliquity_rad.cos();
    let sin_eps = obliquity_rad.sin();

    let x = cos_lat * cos_lon;
    let y = cos_lat * sin_lon * cos_eps - sin_lat * sin_eps;
    let z = cos_lat * sin_lon * sin_eps + sin_lat * cos_eps;

    Direction3::new(x, y, z)
}

/// Mean obliquity of the ecliptic at J2000.0 in radians.
pub const OBLIQUITY_J2000: f64 = 0.4090928042223415; // 23.439291111 degrees

/// Mean obliquity of the ecliptic of date (IAU polynomial), radians.
pub fn mean_obliquity(jde: f64) -> f64 {
    let t = (jde - 2451545.0) / 36525.0;
    let deg = 23.439291111 - 0.0130041667 * t - 1.6389e-7 * t * t + 5.0361e-7 * t * t * t;
    deg * PI / 180.0
}
